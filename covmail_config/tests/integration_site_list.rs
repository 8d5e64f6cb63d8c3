//! Integration tests for loading site lists from disk.

use covmail_config::{ConfigError, SiteList};

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("site_list_dev.json");
    std::fs::write(
        &path,
        r#"[
  {"Site_Name": "North", "Email_Account": "north@example.org", "Folder_Path": "Inbox/Results"},
  {"Site_Name": "South", "Email_Account": "south@example.org", "Folder_Path": "Inbox"}
]"#,
    )
    .expect("site list should be written");

    let list = SiteList::load_from(&path).expect("site list should load");

    assert_eq!(list.len(), 2);
    assert_eq!(list.sites()[1].site_name, "South");
    assert_eq!(list.batches()[0].folder_path, "Inbox/Results");
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("absent.json");

    let result = SiteList::load_from(&path);
    assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == path));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"Site_Name\": ").expect("file should be written");

    assert!(matches!(
        SiteList::load_from(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_template_refuses_to_overwrite() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("site_list_prod.json");

    SiteList::create_template_at(&path).expect("first write should succeed");
    let loaded = SiteList::load_from(&path).expect("template should load");
    assert_eq!(loaded.len(), 1);

    assert!(matches!(
        SiteList::create_template_at(&path),
        Err(ConfigError::AlreadyExists(_))
    ));
}
