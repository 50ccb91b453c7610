use console::{Emoji, style};

use crate::core::relay::Role;

pub static SUCCESS_ICON: Emoji<'_, '_> = Emoji("✅ ", "");
pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static WARN_ICON: Emoji<'_, '_> = Emoji("⚠️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static USER_ICON: Emoji<'_, '_> = Emoji("🧑 ", "> ");
pub static AGENT_ICON: Emoji<'_, '_> = Emoji("🤖 ", "< ");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

pub fn print_success(msg: &str) {
    println!("{} {}", SUCCESS_ICON, style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_warn(msg: &str) {
    println!("{} {}", WARN_ICON, style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_turn(role: Role, content: &str) {
    match role {
        Role::User => println!("{}{}", USER_ICON, style(content).bold()),
        Role::Assistant => println!("{}{}", AGENT_ICON, style(content).cyan()),
    }
}

pub fn print_agent_card(name: &str, owner: &str, description: &str) {
    println!("  {}", style(name).bold());
    println!("  {}", style(format!("By {}", owner)).dim());
    println!("  {}\n", description);
}

pub fn print_banner() {
    println!();
    println!("{}", style("Relevance Marketplace").bold().color256(69));
    println!("{}\n", style("Buy and sell AI agents").dim());
}

pub fn print_goodbye() {
    println!("\n{} {}", SPARKLE, style("See you next time!").bold().cyan());
}
