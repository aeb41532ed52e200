mod common;

use std::{fs, path::Path};

use assert_cmd::{assert::Assert, Command};
use common::temp_home;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use regex::Regex;

const SAMPLE: &str = r#"[
  {"id": 1, "merchant": "Amazon", "date": "2024-06-01", "orderNumber": "A-1", "cardUsed": "Visa ****1111",
   "products": [{"name": "Tripod", "quantity": 1, "unitPrice": 25.0}], "total": 25.0, "category": "Camera"},
  {"id": 2, "merchant": "Costco", "date": "2024-05-20", "orderNumber": "C-2", "cardUsed": "Amex ****2222",
   "products": [{"name": "Paper towels", "quantity": 2, "unitPrice": 10.0}], "total": 20.0, "category": "Home"},
  {"id": 3, "merchant": "Amazon", "date": "2024-04-02", "orderNumber": "A-3", "cardUsed": "Visa ****1111",
   "products": [{"name": "Lens cap", "quantity": 1, "unitPrice": 15.0}], "total": 15.0, "category": "Camera"}
]"#;

const INVOICES: &str = r#"[
  {"invoice_id": 1, "merchant_name": "Amazon", "purchase_date": "2024-01-10", "grand_total": "12.50",
   "status": "Paid", "payment_method": "Visa", "categories": ["Camera"]},
  {"invoice_id": 2, "merchant_name": "Target", "purchase_date": "2024-02-03", "grand_total": 30,
   "status": "Open", "categories": []},
  {"invoice_id": 3, "merchant_name": "Amazon", "purchase_date": "2024-02-14", "grand_total": 7.5,
   "status": "Paid", "categories": ["Camera"]}
]"#;

fn run(home: &Path, script: &str) -> Assert {
    Command::cargo_bin("invoice_tracker_cli")
        .unwrap()
        .env("TRACKER_CLI_SCRIPT", "1")
        .env("TRACKER_HOME", home)
        .env("TRACKER_API_URL", "http://127.0.0.1:9")
        .env("TRACKER_COLOR_SCHEME", "light")
        .env("NO_COLOR", "1")
        .write_stdin(script.to_string())
        .assert()
        .success()
}

fn write(home: &Path, name: &str, contents: &str) -> String {
    let path = home.join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn help_and_version_run_offline() {
    let home = temp_home();
    run(&home, "help\nhelp expenses\nversion\nexit\n")
        .stdout(contains("Available commands"))
        .stdout(contains("Usage: expenses"))
        .stdout(contains("Invoice Tracker"))
        .stdout(contains("http://127.0.0.1:9"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = temp_home();
    run(&home, "hepl\n")
        .stdout(contains("Unknown command `hepl`"))
        .stdout(contains("Suggestion: `help`?"));
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let home = temp_home();
    run(&home, "# setup\n\n   \nversion\n").stdout(contains("Invoice Tracker"));
}

#[test]
fn backend_commands_require_login() {
    let home = temp_home();
    run(&home, "invoices list\ncards list\nwhoami\n")
        .stdout(contains("Not signed in. Use `login <email>` first."))
        .stdout(contains("register <username> <email>"));
}

#[test]
fn config_changes_persist_between_runs() {
    let home = temp_home();
    run(&home, "config set currency eur\nconfig backup before-tests\nconfig backups\n")
        .stdout(contains("`currency` updated."))
        .stdout(contains("Settings backed up as"));
    run(&home, "config show\n").stdout(contains("EUR"));
    run(&home, "config set top_limit zero\n").stdout(contains("ERROR"));
}

#[test]
fn theme_and_width_preferences_are_remembered() {
    let home = temp_home();
    run(&home, "theme\ntheme toggle\nwidth full\n")
        .stdout(contains("Theme: light"))
        .stdout(contains("Theme: dark"))
        .stdout(contains("root classes: dark bootstrap-dark"))
        .stdout(contains("Layout: Full Width (full)"));
    run(&home, "theme\nwidth\ntheme system light\n")
        .stdout(contains("Theme: dark"))
        .stdout(contains("Layout: Full Width"))
        .stdout(contains("system change ignored"));
}

#[test]
fn notifications_can_be_listed_and_cleared() {
    let home = temp_home();
    let assert = run(
        &home,
        "notify success \"Saved invoice\" --position bottom-left --sticky\ntoasts\ntoasts clear\ntoasts\n",
    );
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let added = Regex::new(r"Notification [0-9a-f]{8}(-[0-9a-f]{4}){3}-[0-9a-f]{12} added\.").unwrap();
    assert!(added.is_match(&stdout), "{stdout}");

    assert
        .stdout(contains("Saved invoice"))
        .stdout(contains("bottom-left"))
        .stdout(contains("Notifications cleared."))
        .stdout(contains("No active notifications."));
}

#[test]
fn huge_notification_duration_keeps_the_shell_alive() {
    let home = temp_home();
    run(
        &home,
        "notify info hello --duration 18446744073709551615\ntoasts\nconfig set request_timeout_secs 18446744073709551615\nversion\n",
    )
    .stdout(contains("hello"))
    .stdout(contains("at most 86400 seconds"))
    .stdout(contains("Invoice Tracker"));
}

#[test]
fn expenses_group_sample_data() {
    let home = temp_home();
    let sample = write(&home, "sample.json", SAMPLE);
    let script = format!(
        "expenses --sample {path}\nexpenses --group store --search amazon --sample {path}\n",
        path = sample
    );
    run(&home, &script)
        .stdout(contains("Camera (2 items, $40.00)"))
        .stdout(contains("Home (1 items, $20.00)"))
        .stdout(contains("3 of 3 expenses, $60.00 (100.0% of all spending)"))
        .stdout(contains("Amazon (2 items, $40.00)"))
        .stdout(contains("2 of 3 expenses, $40.00 (66.7% of all spending)"))
        .stdout(contains("Categories: Camera, Home"));
}

#[test]
fn summary_lists_top_entries() {
    let home = temp_home();
    let sample = write(&home, "sample.json", SAMPLE);
    run(&home, &format!("summary --limit 1 --sample {}\n", sample))
        .stdout(contains("Count  : 3"))
        .stdout(contains("Total  : $60.00"))
        .stdout(contains("Highest: $25.00"))
        .stdout(contains("Top categories"))
        .stdout(contains("Costco").not());
}

#[test]
fn charts_read_invoice_dumps() {
    let home = temp_home();
    let invoices = write(&home, "invoices.json", INVOICES);
    run(
        &home,
        &format!("chart category --invoices {p}\nchart status --invoices {p}\n", p = invoices),
    )
    .stdout(contains("Camera"))
    .stdout(contains("Uncategorized"))
    .stdout(contains("$30.00"))
    .stdout(contains("Paid"));
}

#[test]
fn expense_dry_run_prints_the_invoice_draft() {
    let home = temp_home();
    run(
        &home,
        "expense add --store Target --category Home --date 2024-06-01 --product \"Desk lamp:10:2\" --dry-run\n",
    )
    .stdout(contains("Target"))
    .stdout(contains("Desk lamp"));

    run(&home, "expense add --category Home --dry-run\n").stdout(contains("ERROR"));
}

#[test]
fn templates_validate_locally() {
    let home = temp_home();
    let good = write(
        &home,
        "good.json",
        r#"{"name": "Amazon", "vendor": "Amazon.com",
            "template_data": {"identification": {"markers": [{"text": "Order Placed", "required": true}]},
                              "fields": [{"field_name": "order_number", "extraction": {"regex": "Order #\\s*(\\S+)"}}]}}"#,
    );
    let bad = write(
        &home,
        "bad.json",
        r#"{"name": "", "template_data": {"fields": [{"field_name": "total", "extraction": {"regex": "("}}]}}"#,
    );
    run(
        &home,
        &format!("templates validate {}\ntemplates validate {}\ntemplates new\n", good, bad),
    )
    .stdout(contains("Amazon (Amazon.com) v1.0 is valid (1 markers, 1 fields)."))
    .stdout(contains("Template name is required"))
    .stdout(contains("All required markers must have text"))
    .stdout(contains("invalid extraction regex"))
    .stdout(contains("\"version\": \"1.0\""));
}

#[test]
fn card_numbers_are_checked_without_login() {
    let home = temp_home();
    run(&home, "cards check 4242 4242 4242 4242\ncards check 4242424242424241\n")
        .stdout(contains("ending in 4242"))
        .stdout(contains("failed the checksum"));
}

#[test]
fn ocr_rejects_non_pdf_files() {
    let home = temp_home();
    let image = write(&home, "scan.png", "not really a png");
    run(&home, &format!("ocr {}\n", image)).stdout(contains("Only PDF files are supported."));
}
