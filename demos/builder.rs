use json_dict::{Dictionary, Policy, WriteMode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("json_dict_example_builder.json");
    let _ = std::fs::remove_file(&path);

    // pretty-printed JSON, upserting adds, temp-file + rename writes
    let dict = Dictionary::builder(&path)
        .policy(Policy::Lenient)
        .pretty(true)
        .write_mode(WriteMode::Atomic)
        .build()?;

    dict.add("name", "json-dict")?;
    dict.add("name", "json-dict, again")?;
    dict.remove("never-added")?;

    let contents = std::fs::read_to_string(dict.path())?;
    println!("On-disk JSON:\n{contents}");
    println!("\nDebug output: {dict:?}");

    let _ = std::fs::remove_file(&path);
    Ok(())
}
