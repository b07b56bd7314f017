//! The `timequiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("timequiz.toml").exists() {
        println!("timequiz.toml already exists, skipping.");
    } else {
        std::fs::write("timequiz.toml", SAMPLE_CONFIG)?;
        println!("Created timequiz.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: timequiz validate");
    println!("  2. Run: timequiz play --quiz example");
    println!("  3. Run: timequiz review");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# timequiz configuration

# Quiz file or directory of quiz files
bank_dir = "quizzes"

# Where progress and results are kept
data_dir = ".timequiz"

# Time allowed per quiz, in seconds
duration_secs = 7200
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
key = "example"
name = "Example Quiz"
description = "A short quiz to get started"

[[questions]]
id = 1
prompt = "Which planet is closest to the Sun?"
answers = ["Venus", "Mercury", "Mars", "Earth"]

[questions.correct_answer]
text = "Mercury"
explanation = "Mercury orbits at about 0.39 AU, closer than any other planet."

[[questions]]
id = 2
prompt = "Which language has the largest number of native speakers, according to the table?"
answers = ["English", "Spanish", "Mandarin Chinese", "Hindi"]

[questions.correct_answer]
text = "Mandarin Chinese"
explanation = "Mandarin has the largest native-speaker population in the table."

[questions.table]
headers = ["Language", "Native speakers (millions)"]
rows = [
    ["Mandarin Chinese", "940"],
    ["Spanish", "485"],
    ["English", "380"],
    ["Hindi", "345"],
]

[[questions]]
id = 3
prompt = "What is 7 x 8?"
answers = ["54", "56", "58", "64"]

[questions.correct_answer]
text = "56"
explanation = "7 x 8 = 56."
"#;
