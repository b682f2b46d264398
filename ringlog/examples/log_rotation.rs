use std::path::PathBuf;

use ringlog::logger_config;

fn main() {
    let dir = PathBuf::from("/tmp/ringlog_example_rotation");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let config = dir.join("log.json");
    std::fs::write(
        &config,
        format!(
            r#"{{"LOGDIR": {:?}, "MODULE": "demo", "LEVEL": 4, "MAXFILESIZE": 1024, "MAXFILECOUNT": 3, "CONSOLE": false, "LOG2FILE": true}}"#,
            dir.join("logs")
        ),
    )
    .unwrap();

    let logger = logger_config()
        .with_config_path(&config)
        .with_run_id("rotation-demo")
        .honor_sink_flags()
        .build();

    for i in 0..100 {
        ringlog::info!(logger: &logger, "Log message number {i}");
    }

    let mut files: Vec<String> = std::fs::read_dir(dir.join("logs"))
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    files.sort();

    println!("\n--- Rotation Summary ---");
    println!("Log directory: {}", dir.join("logs").display());
    println!("Active slot: {}", logger.current_file_index());
    println!("Files in the ring (max_file_count=3): {}", files.len());
    for f in &files {
        println!("  {f}");
    }
    assert!(files.len() <= 3, "the ring keeps at most 3 slots per day");
}
