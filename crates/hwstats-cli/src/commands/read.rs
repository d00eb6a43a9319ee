use hwstats_core::Reader;

use super::FactoryOptions;
use crate::format;

pub fn run(options: &FactoryOptions<'_>, kinds: &[String], json: bool) {
    let factory = super::make_factory(options);
    let kinds = match super::parse_kinds(kinds, &factory.available()) {
        Ok(kinds) => kinds,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let unit = factory.config().temperature_unit;

    for kind in kinds {
        let mut reader = factory.create(kind);
        let Some(snapshot) = reader.snapshot() else {
            if json {
                println!("{}", serde_json::json!({ "kind": kind, "data": null }));
            } else {
                println!("[{kind}]\n  (unavailable)");
            }
            continue;
        };

        if json {
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("Error: {kind}: {e}"),
            }
        } else {
            print!("{}", format::render(&snapshot, unit));
        }
    }
}
