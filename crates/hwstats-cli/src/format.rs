//! Plain-text rendering of snapshots.

use hwstats_core::codec::{readable_size, round_to};
use hwstats_core::{
    AnySnapshot, BatterySnapshot, Fan, Gpus, NetworkSnapshot, ProcessUsage, Sensor, SensorKind,
    TemperatureUnit,
};

/// Render one snapshot as indented lines under a `[kind]` heading.
pub fn render(snapshot: &AnySnapshot, unit: TemperatureUnit) -> String {
    let body = match snapshot {
        AnySnapshot::Cpu(list) => processes(list, |usage| format!("{usage:.1}%")),
        AnySnapshot::Ram(list) => processes(list, readable_size),
        AnySnapshot::Gpu(gpus) => gpu(gpus),
        AnySnapshot::Battery(battery) => battery_lines(battery, unit),
        AnySnapshot::Fans(list) => fans(list),
        AnySnapshot::Network(network) => network_lines(network),
        AnySnapshot::Sensors(list) => sensors(list, unit),
    };

    let mut out = format!("[{}]\n", snapshot.kind());
    if body.is_empty() {
        out.push_str("  (no data)\n");
    }
    for line in body {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn processes(list: &[ProcessUsage], usage: impl Fn(f64) -> String) -> Vec<String> {
    list.iter()
        .map(|p| {
            let name = p.name.as_deref().unwrap_or(&p.command);
            format!("{:>7}  {:<32} {:>10}", p.pid, name, usage(p.usage))
        })
        .collect()
}

fn gpu(gpus: &Gpus) -> Vec<String> {
    gpus.list
        .iter()
        .map(|g| match g.utilization {
            Some(u) => format!("{:<16} {:>5.1}%  ({})", g.model.label(), u * 100.0, g.io_class),
            None => format!("{:<16}     -   ({})", g.model.label(), g.io_class),
        })
        .collect()
}

fn battery_lines(b: &BatterySnapshot, unit: TemperatureUnit) -> Vec<String> {
    let mut lines = vec![
        format!("source       {}", b.power_source),
        format!("level        {:.0}%", b.level * 100.0),
        format!(
            "charging     {}{}",
            if b.is_charging { "yes" } else { "no" },
            if b.is_charged { " (charged)" } else { "" }
        ),
        format!("cycles       {}", b.cycles),
        format!("health       {}", b.health),
        format!("amperage     {} mA", b.amperage),
        format!("voltage      {:.2} V", b.voltage),
        temperature_line("temperature  ", b.temperature, unit),
        format!("adapter      {} W", b.ac_watts),
        format!("to empty     {} min", b.time_to_empty),
        format!("to full      {} min", b.time_to_charge),
    ];
    if let Some(state) = &b.state {
        lines.insert(5, format!("condition    {state}"));
    }
    lines
}

fn temperature_line(label: &str, celsius: f64, unit: TemperatureUnit) -> String {
    format!("{label}{:.1} {}", unit.convert(celsius), unit.symbol())
}

fn fans(list: &[Fan]) -> Vec<String> {
    list.iter()
        .map(|f| {
            format!(
                "{:<2} {:<16} {:>10}  [{:.0}..{:.0}]{}",
                f.id,
                f.name,
                f.formatted_value(),
                f.min_speed,
                f.max_speed,
                if f.enabled { "" } else { "  disabled" }
            )
        })
        .collect()
}

fn network_lines(n: &NetworkSnapshot) -> Vec<String> {
    let mut lines = vec![
        format!(
            "interval     up {:>10}  down {:>10}",
            readable_size(n.bandwidth.upload as f64),
            readable_size(n.bandwidth.download as f64)
        ),
        format!(
            "total        up {:>10}  down {:>10}",
            readable_size(n.total.upload as f64),
            readable_size(n.total.download as f64)
        ),
    ];
    if let Some(address) = &n.local_address {
        lines.push(format!("address      {address}"));
    }
    lines
}

fn sensors(list: &[Sensor], unit: TemperatureUnit) -> Vec<String> {
    list.iter()
        .map(|s| {
            let label = format!("{} {:<28} ", s.key, s.name);
            match s.kind {
                SensorKind::Temperature => temperature_line(&label, s.value, unit),
                kind => format!("{label}{} {}", round_to(s.value, 2), kind.unit()),
            }
        })
        .collect()
}
