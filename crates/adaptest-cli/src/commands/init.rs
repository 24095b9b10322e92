//! The `adaptest init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("adaptest.toml").exists() {
        println!("adaptest.toml already exists, skipping.");
    } else {
        std::fs::write("adaptest.toml", SAMPLE_CONFIG)?;
        println!("Created adaptest.toml");
    }

    std::fs::create_dir_all("item-banks")?;
    let example_path = std::path::Path::new("item-banks/example.toml");
    if example_path.exists() {
        println!("item-banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created item-banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add items to item-banks/example.toml");
    println!("  2. Run: adaptest validate --bank item-banks/example.toml");
    println!("  3. Run: adaptest simulate --bank item-banks/example.toml --format html");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptest configuration

# Starting level for new sessions: a CEFR label or a numeric ability.
initial_level = "B1"

# Stopping rule: stop at this standard error once min_questions are answered.
se_threshold = 0.3
min_questions = 10
max_questions = 30

# Unrecognised difficulty labels: "lenient" (treated as B1) or "strict" (error).
unknown_level = "lenient"

# Simulation
replications = 20
seed = 42
output_dir = "./adaptest-results"
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Item Bank"
description = "A small example bank to get started"

[[items]]
id = "a1-greetings"
difficulty = "A1"
category = "vocabulary"

[[items]]
id = "a1-numbers"
difficulty = "A1"
category = "vocabulary"

[[items]]
id = "a2-past-simple"
difficulty = "A2"
category = "grammar"

[[items]]
id = "a2-directions"
difficulty = "A2"
category = "reading"

[[items]]
id = "b1-present-perfect"
difficulty = "B1"
category = "grammar"

[[items]]
id = "b1-email"
difficulty = "B1"
category = "reading"

[[items]]
id = "b2-conditionals"
difficulty = "B2"
category = "grammar"

[[items]]
id = "b2-article"
difficulty = 1.2
category = "reading"

[[items]]
id = "c1-inversion"
difficulty = "C1"
category = "grammar"

[[items]]
id = "c1-idioms"
difficulty = "C1"
category = "vocabulary"

[[items]]
id = "c2-register"
difficulty = "C2"
category = "reading"

[[items]]
id = "c2-nuance"
difficulty = "C2"
category = "vocabulary"
"#;
