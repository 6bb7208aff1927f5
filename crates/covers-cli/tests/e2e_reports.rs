//! E2E tests for the report commands:
//! `covers summary`, `covers customers`, `covers categories`, `covers items`,
//! `covers weekdays`, `covers trend`, `covers periods`, `covers report`.
//!
//! Covers: JSON payload shape and values, text rows, empty selections,
//! config-file lookup, and structured load/filter errors.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

const SALES: &str = "\
order_id,order_date,cust_id,category,item_name,quantity,price,order_total
1001,2023-01-02 11:15:00,17,Main Dishes,Pad Thai,2,12.50,25.00
1001,2023-01-02 11:15:00,17,Drinks,Iced Tea,2,3.00,6.00
1002,2023-01-03 19:40:00,4,Main Dishes,Green Curry,1,14.00,14.00
1003,2023-01-09 12:05:00,17,Desserts,Mango Sticky Rice,1,7.50,7.50
1004,2023-02-14 20:10:00,4,Main Dishes,Pad Thai,3,12.50,37.50
1005,2023-02-15 13:00:00,9,Drinks,Iced Tea,1,3.00,3.00
";

fn covers_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("covers"));
    cmd.current_dir(dir);
    cmd.env("COVERS_LOG", "error");
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd.env_remove("COVERS_DATA");
    cmd.env_remove("FORMAT");
    cmd
}

fn write_sales(dir: &Path) -> PathBuf {
    let path = dir.join("sales.csv");
    fs::write(&path, SALES).unwrap();
    path
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = covers_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("covers should not crash");
    assert!(
        output.status.success(),
        "covers {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

// ---------------------------------------------------------------------------
// Report payloads
// ---------------------------------------------------------------------------

#[test]
fn summary_json_has_kpis() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    let json = run_json(dir.path(), &["summary", "--data", "sales.csv"]);
    let kpis = &json["kpis"];
    assert_eq!(kpis["total_revenue"].as_f64(), Some(93.0));
    assert_eq!(kpis["order_count"], 5);
    assert_eq!(kpis["record_count"], 6);
    assert_eq!(kpis["total_quantity"], 10);
    assert_eq!(kpis["avg_order_value"].as_f64(), Some(15.5));
    assert!(json["source"].as_str().unwrap().ends_with("sales.csv"));
}

#[test]
fn customers_json_ranks_and_breaks_ties() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    let json = run_json(dir.path(), &["customers", "--data", "sales.csv", "--limit", "2"]);
    assert_eq!(json["top_spender"]["customer_id"], "4");
    assert_eq!(json["top_spender"]["total_revenue"].as_f64(), Some(51.5));
    assert_eq!(json["top_spenders"].as_array().unwrap().len(), 2);
    assert_eq!(json["top_spenders"][1]["customer_id"], "17");

    // 4 and 17 both have two orders.
    assert_eq!(json["most_loyal"]["customer_id"], "4");
    assert_eq!(json["most_loyal"]["purchase_count"], 2);
}

#[test]
fn categories_text_rows_sorted_by_revenue() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    covers_cmd(dir.path())
        .args(["categories", "--data", "sales.csv", "--format", "text"])
        .assert()
        .success()
        .stdout(
            "category\ttotal_revenue\ttotal_quantity\n\
             Main Dishes\t76.50\t6\n\
             Drinks\t9.00\t3\n\
             Desserts\t7.50\t1\n",
        );
}

#[test]
fn items_in_one_category() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    let json = run_json(dir.path(), &["items", "--data", "sales.csv", "--in", "Main Dishes"]);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["item"], "Pad Thai");
    assert_eq!(items[0]["total_revenue"].as_f64(), Some(62.5));
    assert_eq!(items[0]["total_quantity"], 5);
    assert_eq!(json["category"], "Main Dishes");
}

#[test]
fn weekdays_count_distinct_orders() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    let json = run_json(dir.path(), &["weekdays", "--data", "sales.csv"]);
    let days: Vec<(String, u64)> = json["weekdays"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| {
            (
                d["weekday"].as_str().unwrap().to_string(),
                d["order_count"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        days,
        vec![
            ("Monday".to_string(), 2),
            ("Tuesday".to_string(), 2),
            ("Wednesday".to_string(), 1),
        ]
    );
}

#[test]
fn monthly_trend_and_empty_month() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    let json = run_json(
        dir.path(),
        &["trend", "--data", "sales.csv", "--granularity", "month"],
    );
    assert_eq!(json["granularity"], "month");
    assert_eq!(json["points"][0]["period"], "2023-01");
    assert_eq!(json["points"][1]["revenue"].as_f64(), Some(40.5));

    let json = run_json(
        dir.path(),
        &["trend", "--data", "sales.csv", "--year", "2023", "--month", "3"],
    );
    assert_eq!(json["points"].as_array().unwrap().len(), 0);
}

#[test]
fn periods_lists_months_per_year() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    covers_cmd(dir.path())
        .args(["periods", "--data", "sales.csv", "--format", "text"])
        .assert()
        .success()
        .stdout("year\tmonth\tname\n2023\t1\tJanuary\n2023\t2\tFebruary\n");
}

#[test]
fn report_json_has_every_panel() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    let json = run_json(
        dir.path(),
        &["report", "--data", "sales.csv", "--weekday", "tue"],
    );
    for key in [
        "filter",
        "kpis",
        "top_spender",
        "top_spenders",
        "most_loyal",
        "most_loyal_customers",
        "categories",
        "items",
        "weekdays",
        "trends",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["kpis"]["total_revenue"].as_f64(), Some(51.5));
    assert_eq!(json["trends"][0]["year"], 2023);
    assert_eq!(json["trends"][0]["months"][1]["name"], "February");
}

// ---------------------------------------------------------------------------
// Empty selections
// ---------------------------------------------------------------------------

#[test]
fn empty_selection_is_success_with_empty_state() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    covers_cmd(dir.path())
        .args([
            "customers",
            "--data",
            "sales.csv",
            "--category",
            "Brunch",
            "--format",
            "pretty",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("no data for this selection"));

    let json = run_json(
        dir.path(),
        &["report", "--data", "sales.csv", "--year", "2019"],
    );
    assert!(json["top_spender"].is_null());
    assert!(json["most_loyal"].is_null());
    assert!(json["kpis"]["avg_order_value"].is_null());
    assert_eq!(json["categories"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn project_config_supplies_data_path_and_output() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/sales.csv"), SALES).unwrap();
    fs::write(
        dir.path().join("covers.toml"),
        "[data]\npath = \"data/sales.csv\"\n\n[report]\noutput = \"json\"\ntop_n = 1\n",
    )
    .unwrap();

    let output = covers_cmd(dir.path())
        .args(["customers"])
        .output()
        .expect("covers should not crash");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("config selects JSON");
    assert_eq!(json["top_spenders"].as_array().unwrap().len(), 1);
}

#[test]
fn data_env_var_is_used() {
    let dir = TempDir::new().unwrap();
    let path = write_sales(dir.path());

    covers_cmd(dir.path())
        .env("COVERS_DATA", &path)
        .args(["summary", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total_revenue\t93.00"));
}

#[test]
fn semicolon_delimiter_from_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("sales.csv"),
        "date;customer_id;category;item;quantity;unit_price;revenue\n\
         2024-01-01;C1;Food;Burger;2;10;20\n\
         2024-01-01;C2;Food;Burger;1;10;10\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("covers.toml"),
        "[data]\npath = \"sales.csv\"\ndelimiter = \";\"\n",
    )
    .unwrap();

    let json = run_json(dir.path(), &["categories"]);
    assert_eq!(json["categories"][0]["category"], "Food");
    assert_eq!(json["categories"][0]["total_revenue"].as_f64(), Some(30.0));
    assert_eq!(json["categories"][0]["total_quantity"], 3);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_dataset_fails_with_suggestion() {
    let dir = TempDir::new().unwrap();

    covers_cmd(dir.path())
        .args(["summary", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]: no dataset given"))
        .stderr(predicate::str::contains("--data"));
}

#[test]
fn missing_column_is_reported_as_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.csv"),
        "date,customer_id,category,item,quantity,unit_price\n2024-01-01,C1,Food,Burger,1,10\n",
    )
    .unwrap();

    let output = covers_cmd(dir.path())
        .args(["summary", "--data", "bad.csv", "--json"])
        .output()
        .expect("covers should not crash");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error on stderr");
    assert_eq!(err["error"]["error_code"], "E1002");
    assert!(err["error"]["message"].as_str().unwrap().contains("revenue"));
}

const TAXED: &str = "date,customer_id,category,item,quantity,unit_price,revenue\n\
    2024-01-01,C1,Food,Burger,2,10,20\n\
    2024-01-01,C2,Food,Burger,2,10,25\n";

#[test]
fn revenue_mismatch_keeps_stated_revenue_by_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("taxed.csv"), TAXED).unwrap();

    let json = run_json(dir.path(), &["summary", "--data", "taxed.csv"]);
    assert_eq!(json["kpis"]["total_revenue"].as_f64(), Some(45.0));
}

#[test]
fn revenue_mismatch_names_the_line_when_verified() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("taxed.csv"), TAXED).unwrap();
    fs::write(
        dir.path().join("covers.toml"),
        "[data]\npath = \"taxed.csv\"\nverify_revenue = true\n",
    )
    .unwrap();

    covers_cmd(dir.path())
        .args(["report", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn unknown_weekday_is_an_invalid_filter() {
    let dir = TempDir::new().unwrap();
    write_sales(dir.path());

    covers_cmd(dir.path())
        .args(["weekdays", "--data", "sales.csv", "--weekday", "caturday"])
        .args(["--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));
}

#[test]
fn completions_mention_binary_name() {
    let dir = TempDir::new().unwrap();

    covers_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("covers"));
}
