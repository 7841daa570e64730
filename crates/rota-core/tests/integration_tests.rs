use chrono::{Datelike, Duration, Utc};
use rota_core::db::establish_connection;
use rota_core::models::{
    InstanceStatus, NewDefinitionData, Priority, RuleSpec, RuleType, UpdateDefinitionData,
};
use rota_core::repository::{
    CategoryRepository, DefinitionRepository, GenerationRepository, InstanceFilter,
    InstanceRepository, SettingsRepository, SqliteRepository,
};
use rota_core::settings::{MAX_ADVANCE_MONTHS_KEY, MAX_INSTANCES_KEY};
use tempfile::TempDir;

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    (SqliteRepository::new(pool), temp_dir)
}

/// A weekday number (1=Monday..7=Sunday) guaranteed to be strictly in the
/// future this week, so generated instances never land on today itself.
fn future_weekday(days_from_now: i64) -> u32 {
    (Utc::now().date_naive() + Duration::days(days_from_now))
        .weekday()
        .number_from_monday()
}

async fn add_weekly_definition(repo: &SqliteRepository, title: &str, day: u32) -> rota_core::models::TaskDefinition {
    repo.add_definition(NewDefinitionData {
        title: title.to_string(),
        rule: Some(RuleSpec::weekly(day)),
        ..Default::default()
    })
    .await
    .expect("Failed to create weekly definition")
}

#[tokio::test]
async fn test_one_off_definition_materializes_a_single_instance() {
    let (repo, _temp_dir) = setup_test_db().await;

    let due = Utc::now() + Duration::days(2);
    let definition = repo
        .add_definition(NewDefinitionData {
            title: "Renew passport".to_string(),
            priority: Some(Priority::Urgent),
            due_date: Some(due),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(definition.priority, Priority::Urgent);

    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].status, InstanceStatus::Pending);
    assert_eq!(instances[0].due_date, definition.due_date.unwrap());

    // One-offs have nothing to regenerate.
    let created = repo.regenerate_instances(definition.id).await.unwrap();
    assert_eq!(created, 0);
}

#[tokio::test]
async fn test_due_date_and_rule_are_mutually_exclusive() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo
        .add_definition(NewDefinitionData {
            title: "Conflicted".to_string(),
            due_date: Some(Utc::now() + Duration::days(1)),
            rule: Some(RuleSpec::weekly(3)),
            ..Default::default()
        })
        .await;
    assert!(result.is_err());

    // Same invariant on update: attaching a rule to a one-off requires
    // clearing its due date.
    let definition = repo
        .add_definition(NewDefinitionData {
            title: "One-off".to_string(),
            due_date: Some(Utc::now() + Duration::days(1)),
            ..Default::default()
        })
        .await
        .unwrap();

    let result = repo
        .update_definition(
            definition.id,
            UpdateDefinitionData {
                rule: Some(Some(RuleSpec::monthly(15))),
                ..Default::default()
            },
        )
        .await;
    assert!(result.is_err());

    let updated = repo
        .update_definition(
            definition.id,
            UpdateDefinitionData {
                due_date: Some(None),
                rule: Some(Some(RuleSpec::monthly(15))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.due_date.is_none());
}

#[tokio::test]
async fn test_weekly_definition_generates_a_capped_batch() {
    let (repo, _temp_dir) = setup_test_db().await;

    let day = future_weekday(3);
    add_weekly_definition(&repo, "Take out the bins", day).await;

    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();

    // Default count cap is 4.
    assert_eq!(instances.len(), 4);
    for instance in &instances {
        assert_eq!(instance.status, InstanceStatus::Pending);
        assert_eq!(instance.due_date.date_naive().weekday().number_from_monday(), day);
    }
    for pair in instances.windows(2) {
        assert_eq!(pair[1].due_date - pair[0].due_date, Duration::days(7));
    }
}

#[tokio::test]
async fn test_monthly_definition_targets_the_literal_day() {
    let (repo, _temp_dir) = setup_test_db().await;

    repo.add_definition(NewDefinitionData {
        title: "Pay rent".to_string(),
        rule: Some(RuleSpec::monthly(31)),
        ..Default::default()
    })
    .await
    .unwrap();

    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();

    // Short months contribute nothing, but the 13-month horizon holds
    // plenty of 31-day months for the default cap of 4.
    assert_eq!(instances.len(), 4);
    assert!(instances.iter().all(|i| i.due_date.day() == 31));
}

#[tokio::test]
async fn test_regeneration_is_idempotent() {
    let (repo, _temp_dir) = setup_test_db().await;

    let definition = add_weekly_definition(&repo, "Water the plants", future_weekday(2)).await;
    let before = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();

    // Regeneration recomputes the same candidate set from the unchanged
    // rule: whatever it purges it recreates, and nothing duplicates.
    let created = repo.regenerate_instances(definition.id).await.unwrap();
    assert_eq!(created, 4);
    let created = repo.regenerate_instances(definition.id).await.unwrap();
    assert_eq!(created, 4);

    let after = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    assert_eq!(before.len(), after.len());
    let before_dates: Vec<_> = before.iter().map(|i| i.due_date).collect();
    let after_dates: Vec<_> = after.iter().map(|i| i.due_date).collect();
    assert_eq!(before_dates, after_dates);
}

#[tokio::test]
async fn test_completed_instances_survive_regeneration() {
    let (repo, _temp_dir) = setup_test_db().await;

    let definition = add_weekly_definition(&repo, "Mow the lawn", future_weekday(3)).await;
    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    let first = &instances[0];

    let completed = repo.complete_instance(first.id).await.unwrap();
    assert_eq!(completed.status, InstanceStatus::Completed);
    assert!(completed.completion_date.is_some());

    // Regeneration purges only future pending instances. The completed
    // date is skipped without consuming cap budget, so a full batch of
    // four new pending instances appears beyond it.
    let created = repo.regenerate_instances(definition.id).await.unwrap();
    assert_eq!(created, 4);

    let all = repo
        .find_instances_with_details(&InstanceFilter {
            include_completed: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].id, completed.id);
    assert_eq!(all[0].status, InstanceStatus::Completed);
    assert!(all[1..].iter().all(|i| i.status == InstanceStatus::Pending));
}

#[tokio::test]
async fn test_rule_edit_replaces_future_pending_instances() {
    let (repo, _temp_dir) = setup_test_db().await;

    let old_day = future_weekday(2);
    let new_day = future_weekday(4);
    assert_ne!(old_day, new_day);

    let definition = add_weekly_definition(&repo, "Laundry", old_day).await;
    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    let completed = repo.complete_instance(instances[1].id).await.unwrap();

    repo.update_definition(
        definition.id,
        UpdateDefinitionData {
            rule: Some(Some(RuleSpec::weekly(new_day))),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let now = Utc::now();
    let all = repo
        .find_instances_with_details(&InstanceFilter {
            include_completed: true,
            ..Default::default()
        })
        .await
        .unwrap();

    // History is preserved: the completed old-day instance is untouched.
    assert!(all.iter().any(|i| i.id == completed.id));
    // Everything still pending in the future follows the new weekday.
    for instance in all.iter().filter(|i| i.status == InstanceStatus::Pending) {
        if instance.due_date > now {
            assert_eq!(
                instance.due_date.date_naive().weekday().number_from_monday(),
                new_day
            );
        }
    }
}

#[tokio::test]
async fn test_removing_the_rule_purges_future_pending_only() {
    let (repo, _temp_dir) = setup_test_db().await;

    let definition = add_weekly_definition(&repo, "Stand-up notes", future_weekday(2)).await;
    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    let completed = repo.complete_instance(instances[2].id).await.unwrap();

    repo.update_definition(
        definition.id,
        UpdateDefinitionData {
            rule: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(repo
        .find_rule_for_definition(definition.id)
        .await
        .unwrap()
        .is_none());

    let all = repo
        .find_instances_with_details(&InstanceFilter {
            include_completed: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, completed.id);
    assert_eq!(all[0].status, InstanceStatus::Completed);
}

#[tokio::test]
async fn test_count_cap_is_read_from_settings() {
    let (repo, _temp_dir) = setup_test_db().await;

    repo.set_setting(MAX_INSTANCES_KEY.to_string(), "2".to_string())
        .await
        .unwrap();
    add_weekly_definition(&repo, "Journal", future_weekday(1)).await;

    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    assert_eq!(instances.len(), 2);
}

#[tokio::test]
async fn test_malformed_setting_falls_back_to_default() {
    let (repo, _temp_dir) = setup_test_db().await;

    repo.set_setting(MAX_INSTANCES_KEY.to_string(), "plenty".to_string())
        .await
        .unwrap();
    add_weekly_definition(&repo, "Journal", future_weekday(1)).await;

    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    assert_eq!(instances.len(), 4);
}

#[tokio::test]
async fn test_horizon_cap_bounds_generated_due_dates() {
    let (repo, _temp_dir) = setup_test_db().await;

    repo.set_setting(MAX_INSTANCES_KEY.to_string(), "100".to_string())
        .await
        .unwrap();
    repo.set_setting(MAX_ADVANCE_MONTHS_KEY.to_string(), "1".to_string())
        .await
        .unwrap();
    add_weekly_definition(&repo, "Short horizon", future_weekday(1)).await;

    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();

    // One month is approximated as 30 days: at most 5 weekly occurrences
    // fit, and nothing lands past the horizon.
    assert!(!instances.is_empty());
    assert!(instances.len() <= 5);
    let horizon = Utc::now() + Duration::days(31);
    assert!(instances.iter().all(|i| i.due_date <= horizon));
}

#[tokio::test]
async fn test_deleting_a_definition_cascades() {
    let (repo, _temp_dir) = setup_test_db().await;

    let definition = add_weekly_definition(&repo, "Doomed", future_weekday(2)).await;
    repo.delete_definition(definition.id).await.unwrap();

    assert!(repo
        .find_definition_by_id(definition.id)
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .find_rule_for_definition(definition.id)
        .await
        .unwrap()
        .is_none());
    let instances = repo
        .find_instances_with_details(&InstanceFilter {
            include_completed: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(instances.is_empty());
}

#[tokio::test]
async fn test_complete_and_reopen_transitions() {
    let (repo, _temp_dir) = setup_test_db().await;

    add_weekly_definition(&repo, "Inbox zero", future_weekday(1)).await;
    let instances = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    let id = instances[0].id;

    let completed = repo.complete_instance(id).await.unwrap();
    assert_eq!(completed.status, InstanceStatus::Completed);
    assert!(completed.completion_date.is_some());

    // The completion date is set once.
    assert!(repo.complete_instance(id).await.is_err());

    let reopened = repo.reopen_instance(id).await.unwrap();
    assert_eq!(reopened.status, InstanceStatus::Pending);
    assert!(reopened.completion_date.is_none());

    // Pending-only listings hide completed instances.
    repo.complete_instance(id).await.unwrap();
    let pending = repo
        .find_instances_with_details(&InstanceFilter::default())
        .await
        .unwrap();
    assert!(pending.iter().all(|i| i.id != id));
}

#[tokio::test]
async fn test_categories_are_shared_and_detach_on_delete() {
    let (repo, _temp_dir) = setup_test_db().await;

    let definition = repo
        .add_definition(NewDefinitionData {
            title: "Vacuum".to_string(),
            category_name: Some("Household".to_string()),
            rule: Some(RuleSpec::weekly(future_weekday(1))),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(definition.category_id.is_some());

    // A second definition with the same category name reuses the row.
    let other = repo
        .add_definition(NewDefinitionData {
            title: "Dust shelves".to_string(),
            category_name: Some("Household".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(definition.category_id, other.category_id);
    assert_eq!(repo.find_categories().await.unwrap().len(), 1);

    // Deleting the category detaches definitions without deleting them.
    repo.delete_category("Household".to_string()).await.unwrap();
    let detached = repo
        .find_definition_by_id(definition.id)
        .await
        .unwrap()
        .unwrap();
    assert!(detached.category_id.is_none());
}

#[tokio::test]
async fn test_settings_store_upserts() {
    let (repo, _temp_dir) = setup_test_db().await;

    assert!(repo.get_setting(MAX_INSTANCES_KEY).await.unwrap().is_none());

    repo.set_setting(MAX_INSTANCES_KEY.to_string(), "6".to_string())
        .await
        .unwrap();
    repo.set_setting(MAX_INSTANCES_KEY.to_string(), "8".to_string())
        .await
        .unwrap();

    let setting = repo
        .get_setting(MAX_INSTANCES_KEY)
        .await
        .unwrap()
        .expect("setting should exist");
    assert_eq!(setting.value, "8");
    assert_eq!(repo.find_settings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_refresh_all_walks_every_recurring_definition() {
    let (repo, _temp_dir) = setup_test_db().await;

    add_weekly_definition(&repo, "First", future_weekday(1)).await;
    repo.add_definition(NewDefinitionData {
        title: "Second".to_string(),
        rule: Some(RuleSpec::monthly(15)),
        ..Default::default()
    })
    .await
    .unwrap();
    // One-offs are not the engine's concern.
    repo.add_definition(NewDefinitionData {
        title: "Third".to_string(),
        due_date: Some(Utc::now() + Duration::days(1)),
        ..Default::default()
    })
    .await
    .unwrap();

    let summary = repo.refresh_all_definitions().await.unwrap();
    assert_eq!(summary.definitions_processed, 2);
    // Each recurring definition gets a full regenerated batch.
    assert_eq!(summary.instances_created, 8);

    let listing = repo.find_definitions_with_details().await.unwrap();
    assert_eq!(listing.len(), 3);
    assert_eq!(listing[0].rule_type, Some(RuleType::Weekly));
    assert_eq!(listing[1].rule_type, Some(RuleType::Monthly));
    assert_eq!(listing[2].rule_type, None);
}
