//! End-to-end runs of the export job against files in a temp directory.

use std::fs;
use std::path::Path;

use order_export::{run, Config, JobError, VipPolicy};
use tempfile::{tempdir, TempDir};

const HEADER: &str = "customer_id,customer_name,registration_date,is_vip,order_id,order_date,\
product_id,product_name,category,unit_price,item_quantity,total_item_price,\
total_order_value_percentage";

const ORDERS: &str = r#"[
    {"id": "A", "name": "Alice", "registration_date": "2022-01-01",
     "orders": [{"order_id": 1, "order_date": "2022-03-01",
                 "items": [{"item_id": 10, "product_name": "Cable", "category": 1,
                            "price": 10, "quantity": 1}]}]},
    {"id": "B", "name": "Bob", "registration_date": "2022-01-02",
     "orders": [{"order_id": 2, "order_date": "2022-03-02",
                 "items": [{"item_id": 20, "product_name": "Novel", "category": 3,
                            "price": 20, "quantity": 1}]}]}
]"#;

fn setup(orders: &str, vips: &str) -> (TempDir, Config) {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.input.orders_path = dir.path().join("orders.json");
    config.input.vip_path = dir.path().join("vip.txt");
    config.output.path = dir.path().join("out.csv");
    fs::write(&config.input.orders_path, orders).unwrap();
    fs::write(&config.input.vip_path, vips).unwrap();
    (dir, config)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_flag_policy_scenario() {
    let (_dir, config) = setup(ORDERS, "B\n");

    let summary = run(&config).unwrap();
    assert_eq!(summary.customers, 2);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.vip_rows, 1);

    let content = read(&config.output.path);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        lines[1],
        concat!(
            "A,Alice,2022-01-01 00:00:00,false,1,2022-03-01 00:00:00,",
            "10,Cable,Electronics,10.0,1,10.0,100.0"
        )
    );
    assert_eq!(
        lines[2],
        "B,Bob,2022-01-02 00:00:00,true,2,2022-03-02 00:00:00,20,Novel,Books,20.0,1,20.0,100.0"
    );
}

#[test]
fn test_vip_only_policy_keeps_vip_rows() {
    let (_dir, mut config) = setup(ORDERS, "B\n");
    config.processing.vip_policy = VipPolicy::VipOnly;

    run(&config).unwrap();

    let content = read(&config.output.path);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("B,Bob,"));
    assert!(lines.iter().skip(1).all(|l| l.contains(",true,")));
}

#[test]
fn test_empty_vip_list_flags_nothing() {
    let (_dir, config) = setup(ORDERS, "");
    let summary = run(&config).unwrap();
    assert_eq!(summary.vip_rows, 0);
    assert!(read(&config.output.path).lines().skip(1).all(|l| l.contains(",false,")));
}

#[test]
fn test_empty_collection_writes_header_only() {
    let (_dir, config) = setup("[]", "1\n2\n");
    run(&config).unwrap();
    assert_eq!(read(&config.output.path), format!("{}\n", HEADER));
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let (_dir, config) = setup(ORDERS, "A\nB\n");
    run(&config).unwrap();
    let first = fs::read(&config.output.path).unwrap();
    run(&config).unwrap();
    let second = fs::read(&config.output.path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_orders_leave_existing_output_untouched() {
    let (_dir, config) = setup("{ not json", "B\n");
    fs::write(&config.output.path, "previous run").unwrap();

    let err = run(&config).unwrap_err();
    assert!(matches!(err, JobError::DataLoad { .. }));
    assert!(err.to_string().contains("orders.json"));
    assert_eq!(read(&config.output.path), "previous run");
}

#[test]
fn test_missing_orders_creates_no_output() {
    let (dir, mut config) = setup(ORDERS, "B\n");
    config.input.orders_path = dir.path().join("absent.json");

    let err = run(&config).unwrap_err();
    assert!(matches!(err, JobError::DataLoad { .. }));
    assert!(!config.output.path.exists());
}

#[test]
fn test_missing_vip_list_is_load_error() {
    let (dir, mut config) = setup(ORDERS, "");
    config.input.vip_path = dir.path().join("absent.txt");

    let err = run(&config).unwrap_err();
    assert!(err.to_string().contains("VIP list"));
    assert!(!config.output.path.exists());
}

#[test]
fn test_unwritable_output_is_write_error() {
    let (dir, mut config) = setup(ORDERS, "B\n");
    config.output.path = dir.path().join("no_such_dir").join("out.csv");

    let err = run(&config).unwrap_err();
    assert!(matches!(err, JobError::DataWrite { .. }));
    assert!(err.to_string().contains("out.csv"));
}

#[test]
fn test_pickle_input_with_numeric_ids() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.input.orders_path = dir.path().join("customer_orders.pkl");
    config.input.vip_path = dir.path().join("vip_customers.txt");
    config.output.path = dir.path().join("final_customer_orders.csv");

    let value = serde_json::json!([
        {"id": 2, "name": "Cy", "registration_date": "2021-05-05 10:30:00",
         "orders": [{"order_id": "ORD-12", "order_date": "2021-06-01",
                     "items": [{"item_id": "5", "product_name": "Mug", "category": 4,
                                "price": 3.0, "quantity": 3},
                               {"item_id": 1, "product_name": "Tea", "category": 7,
                                "price": 1.0, "quantity": 1}]}]}
    ]);
    let bytes = serde_pickle::to_vec(&value, serde_pickle::SerOptions::new()).unwrap();
    fs::write(&config.input.orders_path, bytes).unwrap();
    fs::write(&config.input.vip_path, "2\n").unwrap();

    let summary = run(&config).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.vip_rows, 2);

    let content = read(&config.output.path);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[1],
        "2,Cy,2021-05-05 10:30:00,true,ORD-12,2021-06-01 00:00:00,1,Tea,Misc,1.0,1,1.0,10.0"
    );
    assert_eq!(
        lines[2],
        "2,Cy,2021-05-05 10:30:00,true,ORD-12,2021-06-01 00:00:00,5,Mug,Home Goods,3.0,3,9.0,90.0"
    );

    let report = summary.report.unwrap();
    assert_eq!(report.orders, 1);
    assert_eq!(report.issue_count(), 0);
}

#[cfg(unix)]
#[test]
fn test_rerun_keeps_output_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, config) = setup(ORDERS, "B\n");
    fs::write(&config.output.path, "previous run").unwrap();
    fs::set_permissions(&config.output.path, fs::Permissions::from_mode(0o644)).unwrap();

    run(&config).unwrap();

    let mode = fs::metadata(&config.output.path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}
