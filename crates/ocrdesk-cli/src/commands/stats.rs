//! `ocrdesk stats` - Print the backend statistics.

use ocrdesk_core::{OcrdeskConfig, Statistics};
use ocrdesk_dashboard::pages::statistic_cards;

pub async fn run(config: &OcrdeskConfig, json: bool) -> anyhow::Result<()> {
    let client = super::api_client(config)?;
    let stats = client.get_statistics().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render(&stats));
    }
    Ok(())
}

/// One aligned line per statistics card, in dashboard order.
fn render(stats: &Statistics) -> String {
    let cards = statistic_cards(stats);
    let width = cards.iter().map(|c| c.title.chars().count()).max().unwrap_or(0);
    cards
        .iter()
        .map(|c| {
            let pad = width - c.title.chars().count();
            format!("{}:{} {}\n", c.title, " ".repeat(pad), c.value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_statistics() {
        let stats = Statistics {
            total_documents: 12,
            processed_documents: 9,
            average_confidence: 0.8,
            total_corrections: 5,
            documents_today: 2,
            ai_accuracy: 0.96,
        };
        let text = render(&stats);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Total de Documentos:    12");
        assert!(lines[3].ends_with(" 80%"));
        assert!(lines[5].starts_with("Precisão da IA:"));
        assert!(lines[5].ends_with(" 96%"));
    }
}
