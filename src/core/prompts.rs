// src/core/prompts.rs — System prompts and user messages for both sessions

use super::project::{fenced_file, ProjectFiles};

pub fn generator_system_prompt(project: &ProjectFiles, framework: &str, suite_name: &str) -> String {
    let language = project.language();
    format!(
        "You are a software tester, specialized on working with {language} projects.\n\
         Your goal is to write a test suite for the given {language} project using the {language} testing framework `{framework}`!\n\n\
         The project has the following structure:\n{tree}\n\
         You will be provided all source files of the project.\n\
         Additionally, feedback to the generated {suite_name} will be provided.\n\n\
         Your task is to improve the generated test suite based on the given feedback or generate the initial one.\n\
         Please ensure that any test suite doesn't change the project structure (i.e. remove temporary testing data after the test execution).\n\n\
         For the given project files only answer with the contents of the {suite_name} file. Respond with {language} code only.",
        tree = project.tree(),
    )
}

pub fn evaluator_system_prompt(project: &ProjectFiles, suite_name: &str) -> String {
    let language = project.language();
    format!(
        "You are a software tester, specialized on working with {language} projects.\n\
         I will provide you a project as well as a proposed set of test cases.\n\n\
         The project has the following structure:\n{tree}\n\
         You will be provided all source files of the project as well as the test suite in {suite_name}.\n\
         Additionally, I will provide you the output of the execution of the test suite.\n\n\
         It is important that you only analyse errors in the test suite.\n\
         Consider the project files to hold the correct behavior!\n\n\
         Please analyse the test suite for completeness and robustness and the execution.\n\
         You shall provide an overview whether the test suite is defined well, covers all decision branches and works correctly.\n\n\
         Please include a score from 0 (not working at all) to 100 (the test suite is complete, no improvements possible/needed).\n\
         Also provide a written feedback stating what might be wrong in the test suite (functionally like wrong imports or logically like uncovered decisions) in 2 to 10 sentences.\n\n\
         Only answer in JSON format as follows:\n\
         {{\n    \"score\": your_score,\n    \"feedback\": your_feedback\n}}",
        tree = project.tree(),
    )
}

pub fn initial_request(project: &ProjectFiles) -> String {
    format!(
        "These are the project file contents:\n{}",
        project.render_sources()
    )
}

pub fn revision_request(project: &ProjectFiles, feedback: &str) -> String {
    format!(
        "Your generated test suite was analysed. This is the feedback:\n\n{}\n\n\
         Please update the test suite accordingly. These are the project file contents:\n{}",
        feedback,
        project.render_sources()
    )
}

pub fn analysis_request(
    project: &ProjectFiles,
    transcript: &str,
    suite_name: &str,
    suite: &str,
) -> String {
    format!(
        "{}These are the project file contents:\n{}\n\
         This is the content of the test suite:\n{}",
        transcript,
        project.render_sources(),
        fenced_file(suite_name, project.language(), suite)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, ProjectFiles) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/lexer.py"), "def lex(): pass\n").unwrap();
        let files = ProjectFiles::load(&root, &[root.join("src/lexer.py")], "python").unwrap();
        (dir, files)
    }

    #[test]
    fn test_generator_prompt_mentions_framework_and_tree() {
        let (_dir, p) = project();
        let prompt = generator_system_prompt(&p, "unittest", "tests.py");
        assert!(prompt.contains("`unittest`"));
        assert!(prompt.contains("project/\n└─src/\n  └─lexer.py\n"));
        assert!(prompt.contains("only answer with the contents of the tests.py file"));
    }

    #[test]
    fn test_evaluator_prompt_asks_for_json() {
        let (_dir, p) = project();
        let prompt = evaluator_system_prompt(&p, "tests.py");
        assert!(prompt.contains("\"score\": your_score"));
        assert!(prompt.contains("Consider the project files to hold the correct behavior!"));
    }

    #[test]
    fn test_revision_request_carries_feedback_and_sources() {
        let (_dir, p) = project();
        let msg = revision_request(&p, "missing edge case for empty input");
        assert!(msg.contains("This is the feedback:\n\nmissing edge case for empty input\n\n"));
        assert!(msg.contains(" - lexer.py\n```python\ndef lex(): pass\n```\n"));
    }

    #[test]
    fn test_analysis_request_order() {
        let (_dir, p) = project();
        let msg = analysis_request(&p, "TRANSCRIPT\n", "tests.py", "import unittest\n");
        let t = msg.find("TRANSCRIPT").unwrap();
        let src = msg.find(" - lexer.py").unwrap();
        let suite = msg.find(" - tests.py").unwrap();
        assert!(t < src && src < suite);
        assert!(msg.ends_with("```python\nimport unittest\n```\n"));
    }
}
