//! Welcome banner display for terminal chat.

use console::style;

/// Print the welcome banner: provider, model and memory size.
pub fn print_welcome_banner(provider: &str, model: &str, max_turns: usize) {
    println!();
    println!("  * {}", style("bonechat").cyan().bold());
    println!();
    println!(
        "  {}  {} {}",
        style("Model:").bold(),
        style(model).dim(),
        style(format!("({provider})")).dim()
    );
    println!(
        "  {} {}",
        style("Memory:").bold(),
        style(format!("last {max_turns} exchanges")).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
