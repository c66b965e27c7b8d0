use json_dict::Dictionary;
use std::sync::Arc;
use std::thread;

fn main() -> Result<(), json_dict::Error> {
    let path = std::env::temp_dir().join("json_dict_example_concurrent.json");
    let _ = std::fs::remove_file(&path);
    let dict = Arc::new(Dictionary::open(&path)?);

    // every add is a full read-modify-write of the file, queued one at a time
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let dict = Arc::clone(&dict);
            thread::spawn(move || -> Result<(), json_dict::Error> {
                for i in 0..25 {
                    dict.add(&format!("word-{t}-{i}"), &format!("written by thread {t}"))?;
                }
                Ok(())
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer thread panicked")?;
    }

    let (words, _) = dict.list()?;
    println!("{} words on disk (expected 200)", words.len());

    dict.shutdown();
    let _ = std::fs::remove_file(&path);
    Ok(())
}
