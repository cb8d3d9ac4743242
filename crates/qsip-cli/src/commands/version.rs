//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - OpenQASM 3 to quantikz circuit diagrams",
        style("QSIP").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qsip-ir        Circuit model and diagnostics");
    println!("  qsip-qasm      OpenQASM 3 parser and circuit builder");
    println!("  qsip-quantikz  Layout, quantikz renderer and LaTeX backend");
    println!("  qsip-cli       Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
