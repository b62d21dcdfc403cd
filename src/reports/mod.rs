use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keysolve::corpus::Corpus;
use keysolve::geometry::{KeyPos, COLS, FINGER_ROWS, THUMB_KEYS, THUMB_ROW};
use keysolve::layout::{Layout, NO_KEY, SPACE_TOKEN};
use keysolve::ranking::RankedLayout;
use keysolve::scorer::{AnalysisResult, Metric, MetricKind};

const FINGER_NAMES: [&str; 10] = ["LP", "LR", "LM", "LI", "LT", "RT", "RI", "RM", "RR", "RP"];
const ROW_NAMES: [&str; 4] = ["Top", "Home", "Bottom", "Thumb"];

fn visible(s: &str) -> String {
    s.chars()
        .map(|c| if c == ' ' { SPACE_TOKEN } else { c })
        .collect()
}

fn metric_color(metric: Metric) -> Color {
    match metric {
        Metric::Sfb | Metric::Sfs => Color::Red,
        Metric::Alt | Metric::Rol => Color::Green,
        _ => Color::Reset,
    }
}

fn right_align_from(table: &mut Table, first: usize, last: usize) {
    for i in first..=last {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn print_layout_grid(layout: &Layout) {
    println!("\nLayout: {}", layout.name);
    let mut table = new_table();

    let key_cell = |slot: usize| {
        let s = match layout.char_at(slot) {
            None => NO_KEY.to_string(),
            Some(c) => visible(&c.to_string()),
        };
        let cell = Cell::new(s).set_alignment(CellAlignment::Center);
        if layout.is_pinned(slot) {
            cell.add_attribute(Attribute::Underlined)
        } else {
            cell
        }
    };

    for row in 0..FINGER_ROWS as u8 {
        table.add_row((0..COLS as u8).map(|col| key_cell(KeyPos::new(row, col).slot())));
    }
    let pad = (COLS - THUMB_KEYS) / 2;
    let mut thumbs: Vec<Cell> = (0..pad).map(|_| Cell::new("")).collect();
    thumbs.extend((0..THUMB_KEYS as u8).map(|col| key_cell(KeyPos::new(THUMB_ROW, col).slot())));
    table.add_row(thumbs);

    println!("{}", table);
}

/// One row per layout, one column per metric.
pub fn print_metric_table(results: &[AnalysisResult], metrics: &[Metric]) {
    let mut table = new_table();
    let mut header = vec![Cell::new("Layout").add_attribute(Attribute::Bold)];
    header.extend(
        metrics
            .iter()
            .map(|&m| Cell::new(m.to_string()).fg(metric_color(m))),
    );
    table.add_row(header);
    right_align_from(&mut table, 1, metrics.len());

    for r in results {
        let mut row = vec![Cell::new(&r.layout_name).add_attribute(Attribute::Bold)];
        row.extend(
            metrics
                .iter()
                .map(|&m| Cell::new(format!("{:.3}%", r.metric(m))).fg(metric_color(m))),
        );
        table.add_row(row);
    }
    println!("\n{}", table);
}

pub fn print_usage(result: &AnalysisResult) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Usage").add_attribute(Attribute::Bold),
        Cell::new("%"),
    ]);
    right_align_from(&mut table, 1, 1);

    for (name, v) in ["Left", "Right"].iter().zip(result.usage.hands) {
        table.add_row(vec![Cell::new(name), Cell::new(format!("{:.2}", v))]);
    }
    for (name, v) in FINGER_NAMES.iter().zip(result.usage.fingers) {
        table.add_row(vec![Cell::new(name), Cell::new(format!("{:.2}", v))]);
    }
    for (name, v) in ROW_NAMES.iter().zip(result.usage.rows) {
        table.add_row(vec![Cell::new(name), Cell::new(format!("{:.2}", v))]);
    }
    println!("{}", table);

    if !result.unsupported.is_empty() {
        let listed: Vec<String> = result
            .unsupported
            .iter()
            .take(20)
            .map(|(c, n)| format!("{}:{}", visible(&c.to_string()), n))
            .collect();
        println!("Not on layout: {}", listed.join(" "));
    }
}

/// Worst n-grams for every listed metric that keeps details.
pub fn print_offenders(result: &AnalysisResult, metrics: &[Metric]) {
    for &metric in metrics.iter().filter(|m| m.has_details()) {
        let details = result.details(metric);
        if details.is_empty() {
            continue;
        }
        let mut table = new_table();
        let label = match metric.kind() {
            MetricKind::Skipgram => "Skipgram",
            _ => "Bigram",
        };
        table.set_header(vec![
            Cell::new(format!("{} {}", metric, label)).fg(metric_color(metric)),
            Cell::new("Count"),
            Cell::new("%"),
            Cell::new("Dist"),
        ]);
        right_align_from(&mut table, 1, 3);
        for d in details {
            table.add_row(vec![
                Cell::new(visible(&d.ngram)),
                Cell::new(d.count),
                Cell::new(format!("{:.3}", d.percentage)),
                Cell::new(format!("{:.2}", d.distance)),
            ]);
        }
        println!("{}", table);
    }
}

pub fn print_ranking(ranked: &[RankedLayout], metrics: &[Metric]) {
    let mut table = new_table();
    let mut header = vec![
        Cell::new("#"),
        Cell::new("Layout").add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
    ];
    header.extend(
        metrics
            .iter()
            .map(|&m| Cell::new(m.to_string()).fg(metric_color(m))),
    );
    table.add_row(header);
    right_align_from(&mut table, 2, metrics.len() + 2);

    for (i, r) in ranked.iter().enumerate() {
        let mut row = vec![
            Cell::new(i + 1),
            Cell::new(&r.name).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.3}", r.score)).fg(Color::Cyan),
        ];
        row.extend(
            metrics
                .iter()
                .map(|&m| Cell::new(format!("{:.2}", r.result.metric(m)))),
        );
        table.add_row(row);
    }
    println!("\n{}", table);
}

pub fn print_corpus_summary(corpus: &Corpus, top: usize) {
    let mut totals = new_table();
    totals.set_header(vec![
        Cell::new(&corpus.name).add_attribute(Attribute::Bold),
        Cell::new("Total"),
        Cell::new("No space"),
        Cell::new("Distinct"),
    ]);
    right_align_from(&mut totals, 1, 3);
    totals.add_row(vec![
        Cell::new("Characters"),
        Cell::new(corpus.total_unigrams),
        Cell::new(corpus.total_unigrams_no_space),
        Cell::new(corpus.unigrams.len()),
    ]);
    totals.add_row(vec![
        Cell::new("Bigrams"),
        Cell::new(corpus.total_bigrams),
        Cell::new(corpus.total_bigrams_no_space),
        Cell::new(corpus.bigrams.len()),
    ]);
    totals.add_row(vec![
        Cell::new("Trigrams"),
        Cell::new(corpus.total_trigrams),
        Cell::new(corpus.total_trigrams_no_space),
        Cell::new(corpus.trigrams.len()),
    ]);
    println!("\n{}", totals);

    if top == 0 {
        return;
    }
    let mut table = new_table();
    table.set_header(vec!["Bigram", "Count", "Trigram", "Count"]);
    right_align_from(&mut table, 1, 1);
    right_align_from(&mut table, 3, 3);
    let bigrams = corpus.top_bigrams(top);
    let trigrams = corpus.top_trigrams(top);
    for i in 0..bigrams.len().max(trigrams.len()) {
        let (b, bn) = bigrams
            .get(i)
            .map(|(b, n)| (visible(&b.iter().collect::<String>()), n.to_string()))
            .unwrap_or_default();
        let (t, tn) = trigrams
            .get(i)
            .map(|(t, n)| (visible(&t.iter().collect::<String>()), n.to_string()))
            .unwrap_or_default();
        table.add_row(vec![b, bn, t, tn]);
    }
    println!("{}", table);
}
