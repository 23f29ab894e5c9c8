use std::sync::Arc;

use chrono::NaiveDate;
use eventdesk::projects::{
    AdmissionState, AnswerValue, ConfigSection, EventService, EventServiceError, FieldId,
    FieldPatch, FieldType, ProjectSeed, ProjectStatus, RegistrationDraft, RegistrationQuery,
};
use eventdesk::storage::{JsonFileStore, MemoryStore};
use serde_json::json;

fn seed() -> ProjectSeed {
    ProjectSeed {
        name: "Spring Meetup".to_string(),
        manager_id: "m3".to_string(),
        date: NaiveDate::from_ymd_opt(2030, 4, 15).expect("valid date"),
        location: "Daejeon".to_string(),
        status: ProjectStatus::Active,
    }
}

#[test]
fn admin_configures_a_form_and_a_guest_registers() {
    let store = MemoryStore::new();
    let service = EventService::new(Arc::new(store.clone()), Arc::new(store));

    let project = service.create_project(seed()).expect("project created");
    let field = service.add_field(&project.id).expect("field added");
    service
        .update_field(
            &project.id,
            &field.id,
            FieldPatch {
                label: Some("Sizes".to_string()),
                field_type: Some(FieldType::Checkbox),
                options: Some(vec!["S".to_string(), "M".to_string(), "L".to_string()]),
                has_other_option: Some(true),
                ..FieldPatch::default()
            },
        )
        .expect("field configured");
    service
        .patch_section(
            &project.id,
            ConfigSection::RegistrationPage,
            &json!({ "isEnabled": true }),
        )
        .expect("registration enabled");
    service
        .patch_section(&project.id, ConfigSection::Policy, &json!({ "maxParticipants": 1 }))
        .expect("capacity set");

    let form = service.registration_form(&project.id).expect("form served");
    assert_eq!(form.admission, AdmissionState::Open);
    assert_eq!(form.fields.len(), 4);

    let ids: Vec<FieldId> = form.fields.iter().map(|field| field.id.clone()).collect();
    let mut draft = RegistrationDraft::new();
    draft.set_value(ids[0].as_str(), "Choi Donghoon");
    draft.set_value(ids[1].as_str(), "+82 10 5555 0100");
    draft.set_value(ids[2].as_str(), "choi@example.com");
    draft.toggle_choice(field.id.as_str(), "M", true);
    draft.toggle_choice(field.id.as_str(), "Other", true);
    draft.set_other_text(field.id.as_str(), "petite");
    draft.agree_privacy(true);

    let receipt = service.submit(&project.id, &draft).expect("registration accepted");
    assert_eq!(
        receipt.registration.answers.get(&field.id),
        Some(&AnswerValue::Choices(vec![
            "M".to_string(),
            "Other: petite".to_string()
        ]))
    );

    match service.submit(&project.id, &draft) {
        Err(EventServiceError::Admission(AdmissionState::Full)) => {}
        other => panic!("expected full admission, got {other:?}"),
    }

    let landing = service.landing(&project.id, true).expect("preview served");
    assert_eq!(landing.capacity.current, 1);
    assert_eq!(landing.call_to_action.state, AdmissionState::Full);
}

#[test]
fn json_store_keeps_projects_and_registrations_across_restarts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("eventdesk.json");

    let project_id = {
        let store = Arc::new(JsonFileStore::open(&path));
        let service = EventService::new(store.clone(), store);
        let project = service.create_project(seed()).expect("project created");
        service
            .patch_section(
                &project.id,
                ConfigSection::RegistrationPage,
                &json!({ "isEnabled": true }),
            )
            .expect("registration enabled");

        let ids: Vec<FieldId> = project
            .registration_page
            .fields
            .iter()
            .map(|field| field.id.clone())
            .collect();
        let mut draft = RegistrationDraft::new();
        draft.set_value(ids[0].as_str(), "Jung Sujin");
        draft.set_value(ids[1].as_str(), "010-2222-3333");
        draft.set_value(ids[2].as_str(), "sujin@example.com");
        draft.agree_privacy(true);
        service.submit(&project.id, &draft).expect("accepted");
        project.id
    };

    let store = Arc::new(JsonFileStore::open(&path));
    let service = EventService::new(store.clone(), store);
    let project = service.project(&project_id).expect("project reloaded");
    assert!(project.registration_page.is_enabled);

    let registrations = service
        .registrations(&project_id, &RegistrationQuery::default())
        .expect("registrations reloaded");
    assert_eq!(registrations.len(), 1);

    let mut csv = Vec::new();
    service
        .export_registrations(&project_id, &mut csv)
        .expect("export");
    let csv = String::from_utf8(csv).expect("utf8");
    assert!(csv.contains("sujin@example.com"));
}
