// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use anyhow::Result;
use monitorlib::{MonitorSettings, ProfileInfo, ProfilingOutcome, RegistrySummary, ScanReport};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
struct ScanOutput<'a> {
    registry: RegistrySummary,
    report: &'a ScanReport,
}

pub fn run(settings: MonitorSettings, json: bool) -> Result<()> {
    let outcome = super::profile(settings)?;

    if json {
        let output = ScanOutput {
            registry: outcome.registry.summary(),
            report: &outcome.report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", render_text(&outcome)?);
    Ok(())
}

/// Plain-text listing of the registry followed by run statistics and issues.
fn render_text(outcome: &ProfilingOutcome) -> Result<String> {
    let mut out = String::new();
    let summary = outcome.registry.summary();
    writeln!(out, "Static members ({}):", summary.statics.len())?;
    for info in &summary.statics {
        write_profile(&mut out, info)?;
    }
    for ty in &summary.types {
        writeln!(out)?;
        writeln!(out, "{} ({}):", ty.type_name, ty.profiles.len())?;
        for info in &ty.profiles {
            write_profile(&mut out, info)?;
        }
    }

    let stats = outcome.report.stats();
    writeln!(out)?;
    writeln!(
        out,
        "{} module(s) scanned, {} skipped, {} candidate type(s), {} profile(s), {} generic member(s) resolved",
        stats.modules_scanned, stats.modules_skipped, stats.candidates, outcome.registry.len(), stats.resolved
    )?;
    for issue in outcome.report.issues() {
        let location = [issue.module.as_deref(), issue.type_name.as_deref(), issue.member.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("::");
        writeln!(out, "  {}: [{location}] {}", issue.severity, issue.message)?;
    }
    Ok(out)
}

fn write_profile(out: &mut String, info: &ProfileInfo) -> std::fmt::Result {
    let mut flags = Vec::new();
    if info.writable {
        flags.push("writable");
    }
    if info.has_validator {
        flags.push("gated");
    }
    if !info.enabled_by_default {
        flags.push("disabled");
    }
    let tags = if info.tags.is_empty() {
        String::new()
    } else {
        format!(" #{}", info.tags.join(" #"))
    };
    writeln!(
        out,
        "  {:<8} {:<20} {:<24} {}{}{}",
        info.member_kind.as_str(),
        info.label,
        info.value_type,
        if flags.is_empty() { String::new() } else { format!("[{}]", flags.join(", ")) },
        if info.holder_type != info.declaring_type_name {
            format!(" via {}", info.holder_type)
        } else {
            String::new()
        },
        tags,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitorlib::{CancellationToken, Profiler, TypeUniverse};

    fn outcome() -> ProfilingOutcome {
        let settings = MonitorSettings {
            async_profiling: false,
            ..MonitorSettings::default()
        };
        Profiler::new(settings)
            .run(&TypeUniverse::loaded(), &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn test_text_listing_covers_demo_types() {
        let text = render_text(&outcome()).unwrap();

        assert!(text.starts_with("Static members (1):\n"));
        assert!(text.contains("\nSoldier ("));
        assert!(text.contains("\nAmmoCrate (2):\n"));
        assert!(text.contains("via Supply<u32>"));
        assert!(text.contains("[writable]"));
        assert!(text.contains("1 module(s) scanned, 0 skipped"));
    }

    #[test]
    fn test_json_output_serializes() {
        let outcome = outcome();
        let output = ScanOutput {
            registry: outcome.registry.summary(),
            report: &outcome.report,
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["registry"]["statics"][0]["label"], "Roster");
        assert!(value["report"]["issues"].as_array().unwrap().is_empty());
    }
}
