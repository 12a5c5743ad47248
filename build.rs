use grep::regex::RegexMatcher;
use grep::searcher::{Searcher, Sink, SinkMatch};
use std::error::Error;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// Source directories owned by this crate. Anything else under the package root
// (target/, vendored data) is not ours to police.
const SOURCE_DIRS: [&str; 3] = ["auc", "tests", "benches"];

// A house rule: a regex over source lines plus the message shown when it fires.
struct Rule {
    name: &'static str,
    pattern: &'static str,
    explanation: &'static str,
    skip_strings_and_comments: bool,
}

const RULES: [Rule; 3] = [
    Rule {
        name: "underscore-prefixed identifiers",
        pattern: r"\b(_[a-zA-Z0-9_]+)\b",
        explanation: "Either use the variable (removing the underscore) or remove it completely.",
        skip_strings_and_comments: true,
    },
    Rule {
        name: "#[allow(dead_code)] attributes",
        pattern: r"#\s*\[\s*allow\s*\(\s*dead_code\s*\)\s*\]",
        explanation: "Either use the code (removing the attribute) or remove it completely.",
        skip_strings_and_comments: false,
    },
    Rule {
        name: "change-log words in comments",
        pattern: r"(//|/\*).*(?:FIXED|CORRECTED|FIX|CHANGED|CHANGE|MODIFIED|MODIFY|UPDATED|UPDATE)",
        explanation: "Comments describe the code as it is, not its history. Remove the comment.",
        skip_strings_and_comments: false,
    },
];

// Collects every violating line of one file for one rule.
struct ViolationCollector {
    violations: Vec<String>,
    skip_strings_and_comments: bool,
}

impl Sink for ViolationCollector {
    type Error = std::io::Error;

    fn matched(&mut self, _: &Searcher, mat: &SinkMatch) -> Result<bool, Self::Error> {
        let line_number = mat.line_number().unwrap_or(0);
        let line_text = std::str::from_utf8(mat.bytes()).unwrap_or("").trim_end();

        if self.skip_strings_and_comments && (is_comment(line_text) || in_string(line_text)) {
            return Ok(true);
        }

        self.violations.push(format!("{line_number}:{line_text}"));
        Ok(true)
    }
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

// Crude but sufficient: an underscore between a pair of quotes is string content.
fn in_string(line: &str) -> bool {
    line.split('"')
        .enumerate()
        .any(|(i, part)| i % 2 == 1 && part.contains('_'))
}

fn rust_sources() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = SOURCE_DIRS
        .iter()
        .flat_map(|dir| WalkDir::new(dir).into_iter().filter_map(|e| e.ok()))
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn check_rule(rule: &Rule, files: &[PathBuf]) -> Result<(), Box<dyn Error>> {
    let matcher = RegexMatcher::new_line_matcher(rule.pattern)?;
    let mut searcher = Searcher::new();

    for path in files {
        let mut collector = ViolationCollector {
            violations: Vec::new(),
            skip_strings_and_comments: rule.skip_strings_and_comments,
        };
        searcher.search_path(&matcher, path, &mut collector)?;
        if !collector.violations.is_empty() {
            return Err(format_violations(rule, path, &collector.violations).into());
        }
    }
    Ok(())
}

fn format_violations(rule: &Rule, path: &Path, violations: &[String]) -> String {
    let mut msg = format!(
        "\n❌ ERROR: Found {} {} in {}:\n",
        violations.len(),
        rule.name,
        path.display()
    );
    for violation in violations {
        msg.push_str(&format!("   {violation}\n"));
    }
    msg.push_str(&format!(
        "\n⚠️ {} are STRICTLY FORBIDDEN in this project.\n   {}\n",
        rule.name, rule.explanation
    ));
    msg
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for dir in SOURCE_DIRS {
        println!("cargo:rerun-if-changed={dir}");
    }

    let files = rust_sources();
    for rule in &RULES {
        if let Err(e) = check_rule(rule, &files) {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
