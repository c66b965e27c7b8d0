use json_dict::Dictionary;

fn main() -> Result<(), json_dict::Error> {
    let path = std::env::temp_dir().join("json_dict_example_basic.json");
    let _ = std::fs::remove_file(&path);
    let dict = Dictionary::open(&path)?;

    // add / get
    dict.add("hello", "a greeting")?;
    dict.add("cat", "a small domesticated feline")?;
    println!("hello = {}", dict.get("hello")?);

    // strict by default: adding twice is refused
    if let Err(e) = dict.add("hello", "something else") {
        println!("second add refused: {e}");
    }

    // update / remove
    dict.update("hello", "a friendly greeting")?;
    println!("hello after update = {}", dict.get("hello")?);
    dict.remove("cat")?;

    let (words, entries) = dict.list()?;
    for word in &words {
        println!("{word:>10}: {}", entries[word]);
    }

    let _ = std::fs::remove_file(&path);
    Ok(())
}
