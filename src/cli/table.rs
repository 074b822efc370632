use std::io::Write;

use crate::error::Result;
use crate::policy::{DispositionEngine, Rule};

/// Print the rule table in the order the engine evaluates it.
pub fn write_rule_table<W: Write>(engine: &DispositionEngine, writer: &mut W) -> Result<()> {
    writeln!(writer, "Passthrough ({}):", engine.passthrough_rules().len())?;
    for rule in engine.passthrough_rules() {
        write_rule(rule, writer)?;
    }
    writeln!(writer, "Rules ({}):", engine.rules().len())?;
    for rule in engine.rules() {
        write_rule(rule, writer)?;
    }
    writeln!(writer, "Default: allow")?;
    Ok(())
}

fn write_rule<W: Write>(rule: &Rule, writer: &mut W) -> Result<()> {
    let categories = if rule.categories().is_empty() {
        "*".to_string()
    } else {
        rule.categories()
            .iter()
            .map(|c| c.as_tag())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let action = match rule.redirect_target() {
        Some(target) => format!("redirect -> {target}"),
        None => format!("{:?}", rule.action()).to_lowercase(),
    };

    writeln!(writer, "  [{}] {} (categories: {})", rule.name(), action, categories)?;
    for pattern in rule.patterns() {
        writeln!(writer, "      match  {pattern}")?;
    }
    for pattern in rule.exceptions() {
        writeln!(writer, "      except {pattern}")?;
    }
    if let Some(note) = rule.note() {
        writeln!(writer, "      # {note}")?;
    }
    Ok(())
}
