use crate::infra::{read_scholarship, PortalStores, SeedData};
use clap::Args;
use scholarship_portal::config::MeritConfig;
use scholarship_portal::error::AppError;
use scholarship_portal::workflows::import::ApplicationCsvImporter;
use scholarship_portal::workflows::merit::{
    Application, ApplicationId, ApplicationStatus, MeritEntry, MeritListSummary, MeritStatus,
    RequestContext, Scholarship, ScholarshipId, ScoringCriterion, StudentRegNo,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Scholarship definition (JSON with number_of_awards and scoring_criteria)
    #[arg(long)]
    pub(crate) scholarship: PathBuf,
    /// CSV export of applications; requires a student_regno column
    #[arg(long)]
    pub(crate) applications: PathBuf,
    /// Override the number of awards from the definition
    #[arg(long)]
    pub(crate) awards: Option<u32>,
    /// Reject definitions whose criteria weights do not total 100
    #[arg(long)]
    pub(crate) enforce_weight_total: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of awards for the sample scholarship
    #[arg(long, default_value_t = 2)]
    pub(crate) awards: u32,
    /// Skip the regeneration and manual status edit steps
    #[arg(long)]
    pub(crate) skip_review: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        scholarship,
        applications,
        awards,
        enforce_weight_total,
    } = args;

    let mut scholarship = read_scholarship(&scholarship)?;
    if awards.is_some() {
        scholarship.number_of_awards = awards;
    }
    let imported = ApplicationCsvImporter::from_path(&applications, &scholarship.id)?;
    let scholarship_id = scholarship.id.clone();
    let title = display_name(&scholarship);

    let stores = PortalStores::default();
    stores.seed(SeedData {
        scholarships: vec![scholarship],
        applications: imported,
    })?;
    let service = stores.service(MeritConfig {
        enforce_weight_total,
        ..MeritConfig::default()
    });

    let summary = service.generate(&RequestContext::new("cli"), &scholarship_id)?;
    let entries = service.merit_list(&scholarship_id)?;

    println!("Merit list for {title}");
    render_merit_list(&entries);
    render_summary(&summary);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        awards,
        skip_review,
    } = args;

    let scholarship = sample_scholarship(awards);
    let scholarship_id = scholarship.id.clone();
    let context = RequestContext::new("demo-admin");

    let stores = PortalStores::default();
    stores.seed(SeedData {
        scholarships: vec![scholarship.clone()],
        applications: sample_applications(&scholarship_id),
    })?;
    let service = stores.service(MeritConfig::default());

    println!("Scholarship merit demo");
    println!(
        "Program: {} ({} award(s), criteria: {})",
        display_name(&scholarship),
        awards,
        scholarship
            .scoring_criteria
            .iter()
            .map(|criterion| format!("{} {}%", criterion.field_label, criterion.weight))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let summary = service.generate(&context, &scholarship_id)?;
    println!("\nInitial merit list");
    render_merit_list(&service.merit_list(&scholarship_id)?);
    render_summary(&summary);

    if skip_review {
        return Ok(());
    }

    stores.applications.extend(vec![demo_application(
        &scholarship_id,
        "app-106",
        "2022-BIO-006",
        json!({ "name": "Farah Siddiqui", "cgpa": "3.97", "income_score": 88 }),
    )])?;
    let summary = service.generate(&context, &scholarship_id)?;
    println!("\nRegenerated after a late approval");
    render_merit_list(&service.merit_list(&scholarship_id)?);
    render_summary(&summary);

    let entries = service.merit_list(&scholarship_id)?;
    if let Some(top) = entries.first() {
        service.update_entry_status(
            &context,
            &scholarship_id,
            &top.student_regno,
            MeritStatus::Awarded,
        )?;
        println!("\nMarked {} as awarded", top.student_regno);
        render_merit_list(&service.merit_list(&scholarship_id)?);
    }

    println!(
        "\nNotifications queued: {}",
        stores.notifications.events().len()
    );
    Ok(())
}

fn display_name(scholarship: &Scholarship) -> String {
    if scholarship.name.trim().is_empty() {
        scholarship.id.to_string()
    } else {
        scholarship.name.clone()
    }
}

fn render_merit_list(entries: &[MeritEntry]) {
    if entries.is_empty() {
        println!("- no entries");
        return;
    }

    for entry in entries {
        let breakdown = entry
            .score_breakdown
            .iter()
            .map(|(field, contribution)| format!("{field}={contribution:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "- #{} {} | {:.2} | {} | {}",
            entry.rank,
            entry.student_regno,
            entry.total_score,
            entry.status.label(),
            breakdown
        );
    }
}

fn render_summary(summary: &MeritListSummary) {
    println!(
        "Summary: {} ranked, {} selected, {} waitlisted, top {:.2}, cutoff {:.2}",
        summary.total_applications,
        summary.selected_count,
        summary.waitlist_count,
        summary.top_score,
        summary.cutoff_score
    );
}

fn sample_scholarship(awards: u32) -> Scholarship {
    Scholarship {
        id: ScholarshipId("sch-demo".to_string()),
        name: "Vice Chancellor's Merit Scholarship".to_string(),
        number_of_awards: Some(awards),
        scoring_criteria: vec![
            ScoringCriterion {
                field_name: "cgpa".to_string(),
                field_label: "CGPA".to_string(),
                weight: 60.0,
            },
            ScoringCriterion {
                field_name: "income_score".to_string(),
                field_label: "Income score".to_string(),
                weight: 40.0,
            },
        ],
        merit_list_generated: false,
    }
}

fn sample_applications(scholarship_id: &ScholarshipId) -> Vec<Application> {
    let mut rejected = demo_application(
        scholarship_id,
        "app-105",
        "2022-CHE-005",
        json!({ "name": "Eli Novak", "cgpa": "3.99", "income_score": 99 }),
    );
    rejected.status = ApplicationStatus::Rejected;

    vec![
        demo_application(
            scholarship_id,
            "app-101",
            "2022-CS-001",
            json!({ "name": "Asha Rao", "cgpa": "3.5", "income_score": 80 }),
        ),
        demo_application(
            scholarship_id,
            "app-102",
            "2022-EE-002",
            json!({ "name": "Bilal Khan", "cgpa": "3.8", "income_score": 70 }),
        ),
        demo_application(
            scholarship_id,
            "app-103",
            "2022-ME-003",
            json!({ "name": "Chen Li", "cgpa": 3.2, "income_score": "1,00" }),
        ),
        demo_application(
            scholarship_id,
            "app-104",
            "2022-CE-004",
            json!({ "name": "Dana Ortiz", "cgpa": "n/a", "income_score": 75 }),
        ),
        rejected,
    ]
}

fn demo_application(
    scholarship_id: &ScholarshipId,
    id: &str,
    regno: &str,
    data: Value,
) -> Application {
    let application_data: BTreeMap<String, Value> = match data {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };

    Application {
        id: ApplicationId(id.to_string()),
        scholarship_id: scholarship_id.clone(),
        student_regno: StudentRegNo(regno.to_string()),
        status: ApplicationStatus::Approved,
        application_data,
    }
}
