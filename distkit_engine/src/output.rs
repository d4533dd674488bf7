use std::fmt::{Display, Write};

use crate::probability::{Distribution, OutcomeKey};

/// Renders `dist` as a table: a header line with the name, base and number of outcomes,
/// followed by one `outcome,probability` row per outcome in linear probability.
pub fn export_table<O: OutcomeKey + Display>(name: &str, dist: &Distribution<O>) -> String {
    let mut string = String::new();
    writeln!(string, "\"{}\",{},{}", name, dist.base(), dist.len()).unwrap();
    writeln!(string, "outcome,probability").unwrap();
    write_rows(&mut string, dist).unwrap();
    string
}

/// The probabilities of `dist` in linear space, paired with their outcomes.
pub fn to_probabilities<O: OutcomeKey>(dist: &Distribution<O>) -> Vec<(&O, f64)> {
    dist.iter()
        .map(|(outcome, p)| (outcome, dist.base().to_linear(p)))
        .collect()
}

fn write_rows<O: OutcomeKey + Display>(
    out: &mut impl Write,
    dist: &Distribution<O>,
) -> std::fmt::Result {
    for (outcome, prob) in to_probabilities(dist) {
        writeln!(out, "{},{}", outcome, prob)?;
    }
    Ok(())
}

impl<O: OutcomeKey + Display> Display for Distribution<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_rows(f, self)
    }
}
