use hairscan_http::{AnalysisOutcome, ChatClient, ImageAnalyzer, ImageUpload, ResilientClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let base_url = std::env::var("HAIRSCAN_BASE_URL")?;
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: analyze <photo.jpg>"))?;

    let client = ResilientClient::from_env().map_err(anyhow::Error::msg)?;
    let analyzer = ImageAnalyzer::new(client.clone(), base_url.as_str());

    let bytes = std::fs::read(&path)?;
    let image = ImageUpload::new(path.as_str(), "image/jpeg", bytes);

    let verdict = match analyzer.analyze(&image).await? {
        AnalysisOutcome::Completed(verdicts) => {
            for verdict in &verdicts {
                println!("{}: {} ({:.0}%)", verdict.stage, verdict.label, verdict.confidence * 100.0);
            }
            verdicts.last().cloned()
        }
        AnalysisOutcome::Rejected { verdict, .. } => {
            println!("photo rejected at {}: {}", verdict.stage, verdict.label);
            return Ok(());
        }
    };

    if let Some(verdict) = verdict {
        let chat = ChatClient::new(client, hairscan_http::join_url(&base_url, "/chat"));
        let reply = chat
            .reply(&[], &format!("My analysis says {}. What should I do next?", verdict.label))
            .await?;
        println!("{}", reply.message.content);
    }

    Ok(())
}
