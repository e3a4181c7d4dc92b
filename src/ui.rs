use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Format a count with a pluralized noun ("1 package", "3 packages")
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Print the closing counts summary every command ends with.
pub fn summary(added: usize, removed: usize, unavailable: usize, failed: usize) {
    println!();
    let line = format!(
        "added: {added}  removed: {removed}  unavailable: {unavailable}  failed: {failed}"
    );
    if failed > 0 || unavailable > 0 {
        println!("{}", line.yellow());
    } else {
        println!("{}", line.green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pluralizes() {
        assert_eq!(count(0, "package"), "0 packages");
        assert_eq!(count(1, "package"), "1 package");
        assert_eq!(count(3, "chunk"), "3 chunks");
    }
}
