use hwstats_core::{ReaderKind, platform_info, reader_info};

use super::FactoryOptions;

pub fn run(options: &FactoryOptions<'_>) {
    let info = platform_info();
    println!("Platform: {} {} (Rust)", info.system, info.machine);
    println!();

    let factory = super::make_factory(options);
    let available = factory.available();

    println!(
        "{} of {} reader(s) available:\n",
        available.len(),
        ReaderKind::ALL.len()
    );
    for kind in ReaderKind::ALL {
        let info = reader_info(kind);
        let mark = if available.contains(&kind) {
            "\u{2705}"
        } else {
            "\u{274C}"
        };
        let requirements: Vec<String> = info.requirements.iter().map(|r| r.to_string()).collect();
        println!(
            "  {mark} {:<10} {:<8} {}{}",
            info.name,
            info.platform,
            info.description,
            if requirements.is_empty() {
                String::new()
            } else {
                format!(" [{}]", requirements.join(", "))
            }
        );
    }
}
