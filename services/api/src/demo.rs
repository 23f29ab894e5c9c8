use crate::infra::ManualClock;
use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Args;
use eventdesk::error::AppError;
use eventdesk::projects::{
    ConfigSection, EventService, EventServiceError, FieldPatch, FieldType, ProjectId,
    ProjectSeed, ProjectStatus, RegistrationDraft, RegistrationQuery,
};
use eventdesk::storage::{JsonFileStore, MemoryStore};
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Event date (YYYY-MM-DD). Defaults to thirty days from today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) event_date: Option<NaiveDate>,
    /// Maximum number of participants for the demo event.
    #[arg(long, default_value_t = 2)]
    pub(crate) capacity: i64,
    /// Print the landing and form payloads as JSON.
    #[arg(long)]
    pub(crate) show_payloads: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON store written by the service (APP_STORAGE=json)
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Project id to export
    #[arg(long)]
    pub(crate) project: String,
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs { data, project } = args;
    if !data.exists() {
        return Err(AppError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no data file at {}", data.display()),
        )));
    }

    let store = Arc::new(JsonFileStore::open(data));
    let service = EventService::new(store.clone(), store);
    let stdout = io::stdout();
    service.export_registrations(&ProjectId(project), stdout.lock())?;
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        event_date,
        capacity,
        show_payloads,
    } = args;

    let today = Local::now().date_naive();
    let event_date = event_date.unwrap_or_else(|| today + Duration::days(30));
    let opens_at = Utc::now() + Duration::days(1);
    let closes_at = opens_at + Duration::days(7);

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = EventService::new(store.clone(), store).with_clock(clock.clone());

    println!("Event registration demo");
    let project = service.create_project(ProjectSeed {
        name: "Spring Meetup".to_string(),
        manager_id: "m1".to_string(),
        date: event_date,
        location: "Seoul Forest Hall".to_string(),
        status: ProjectStatus::Active,
    })?;
    println!("- Created project {} ({}) on {}", project.name, project.id, project.date);

    let field = service.add_field(&project.id)?;
    service.update_field(
        &project.id,
        &field.id,
        FieldPatch {
            label: Some("T-shirt size".to_string()),
            field_type: Some(FieldType::Radio),
            options_text: Some("S, M, L".to_string()),
            has_other_option: Some(true),
            required: Some(true),
            ..FieldPatch::default()
        },
    )?;
    service.patch_section(
        &project.id,
        ConfigSection::LandingPage,
        &json!({ "isEnabled": true, "description": "An evening of talks and food." }),
    )?;
    service.patch_section(
        &project.id,
        ConfigSection::RegistrationPage,
        &json!({ "isEnabled": true }),
    )?;
    service.patch_section(
        &project.id,
        ConfigSection::Schedule,
        &json!({
            "applicationStart": opens_at.to_rfc3339(),
            "applicationEnd": closes_at.to_rfc3339(),
        }),
    )?;
    service.patch_section(
        &project.id,
        ConfigSection::Policy,
        &json!({ "maxParticipants": capacity }),
    )?;
    println!(
        "- Form configured: application window {} -> {}, capacity {}",
        opens_at.format("%Y-%m-%d %H:%M"),
        closes_at.format("%Y-%m-%d %H:%M"),
        capacity
    );

    let landing = service.landing(&project.id, false)?;
    println!(
        "\nBefore the window opens: {} ({})",
        landing.call_to_action.state.label(),
        landing.call_to_action.message
    );

    clock.set(opens_at + Duration::hours(1));
    let form = service.registration_form(&project.id)?;
    println!("Window open: {} ({})", form.admission.label(), form.message);
    println!("Form fields:");
    for field in &form.fields {
        let options = if field.options.is_empty() {
            String::new()
        } else {
            format!(" [{}]", field.options.join(" / "))
        };
        let required = if field.required { " *" } else { "" };
        println!("  - {} ({}){}{}", field.label, field.input_type, options, required);
    }
    if show_payloads {
        match serde_json::to_string_pretty(&form) {
            Ok(json) => println!("  Form payload:\n{}", json),
            Err(err) => println!("  Form payload unavailable: {}", err),
        }
    }

    let guests = [
        ("Kim Minji", "010-1234-5678", "minji@example.com", "Other", Some("XL-custom")),
        ("Lee Jisoo", "010-2345-6789", "jisoo@example.com", "M", None),
        ("Park Hana", "010-3456-7890", "hana@example.com", "S", None),
    ];

    println!("\nSubmissions");
    for (name, phone, email, size, other) in guests {
        let mut draft = RegistrationDraft::new();
        for (starter, value) in form.fields.iter().zip([name, phone, email]) {
            draft.set_value(starter.id.as_str(), value);
        }
        draft.set_value(field.id.as_str(), size);
        if let Some(text) = other {
            draft.set_other_text(field.id.as_str(), text);
        }

        let first_attempt = service.submit(&project.id, &draft);
        if let Err(EventServiceError::Validation(err)) = &first_attempt {
            println!("  - {name}: rejected ({err}); agreeing to the privacy terms and retrying");
            draft.agree_privacy(true);
        }

        let outcome = match first_attempt {
            Err(EventServiceError::Validation(_)) => service.submit(&project.id, &draft),
            other => other,
        };
        match outcome {
            Ok(receipt) => println!(
                "  - {name}: accepted as {} -> \"{}\"",
                receipt.registration.id, receipt.success_message
            ),
            Err(EventServiceError::Admission(state)) => {
                println!("  - {name}: not accepted, {} ({})", state.label(), state.message())
            }
            Err(err) => return Err(err.into()),
        }
    }

    let landing = service.landing(&project.id, false)?;
    println!(
        "\nLanding call to action: {} ({}/{})",
        landing.call_to_action.state.label(),
        landing.capacity.current,
        landing
            .capacity
            .max
            .map(|max| max.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );
    if show_payloads {
        match serde_json::to_string_pretty(&landing) {
            Ok(json) => println!("  Landing payload:\n{}", json),
            Err(err) => println!("  Landing payload unavailable: {}", err),
        }
    }

    clock.set(closes_at + Duration::hours(1));
    let form = service.registration_form(&project.id)?;
    println!("After the window closes: {} ({})", form.admission.label(), form.message);

    let registrations = service.registrations(&project.id, &RegistrationQuery::default())?;
    println!("\nStored registrations: {}", registrations.len());
    println!("CSV export:");
    let stdout = io::stdout();
    service.export_registrations(&project.id, stdout.lock())?;

    Ok(())
}
