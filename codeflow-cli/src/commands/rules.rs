use anyhow::Result;
use codeflow_core::analyzers::cloud::VendorTable;
use codeflow_core::analyzers::security::SECURITY_RULES;

pub fn run(format: &str) -> Result<()> {
    match format {
        "toml" => print_toml(),
        "table" => print_table(),
        other => anyhow::bail!("unknown format: {other} (expected table or toml)"),
    }
    Ok(())
}

fn print_table() {
    let col_widths = (22usize, 9usize, 6usize);

    println!(
        "{:<tag$}  {:<sev$}  {:<ded$}  Description",
        "Rule",
        "Severity",
        "Score",
        tag = col_widths.0,
        sev = col_widths.1,
        ded = col_widths.2,
    );
    println!("{}", "\u{2500}".repeat(col_widths.0 + col_widths.1 + col_widths.2 + 6 + 50));
    for rule in SECURITY_RULES {
        println!(
            "{:<tag$}  {:<sev$}  -{:<ded$.1}  {}",
            rule.kind.tag(),
            rule.severity.to_string(),
            rule.deduction,
            rule.description,
            tag = col_widths.0,
            sev = col_widths.1,
            ded = col_widths.2 - 1,
        );
    }

    println!();
    println!("{:<24}  {:<14}  {:<22}  Usage", "Import pattern", "Provider", "Service");
    println!("{}", "\u{2500}".repeat(24 + 14 + 22 + 6 + 32));
    for v in VendorTable::builtin().vendors() {
        println!("{:<24}  {:<14}  {:<22}  {}", v.pattern, v.provider, v.service, v.usage);
    }
}

fn print_toml() {
    println!("[security]");
    println!("# Rules to skip. Uncomment tags to disable them.");
    println!("disabled = [");
    for rule in SECURITY_RULES {
        println!("  # \"{}\",   # {}: {}", rule.kind.tag(), rule.severity, rule.pattern);
    }
    println!("]");
    println!();
    println!("# Built-in vendors are always matched first; add more below.");
    for v in VendorTable::builtin().vendors() {
        println!("#   {:<18} -> {} / {}", v.pattern, v.provider, v.service);
    }
    println!();
    println!("# [[cloud.vendors]]");
    println!("# pattern  = \"@vercel/\"");
    println!("# provider = \"Vercel\"");
    println!("# service  = \"Vercel SDK\"");
    println!("# usage    = \"Edge and storage APIs\"");
}
