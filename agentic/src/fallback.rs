// Canned tutor replies used when the chat backend cannot be reached.
use serde_json::Value;

const TOPICS: &[(&[&str], &str)] = &[
    (
        &["hello", "halo", "hai"],
        "Hello! I'm ARIA, your Green Computing tutor. The connection is down right now, \
         but I can still help with the basics. What would you like to know about sustainable technology?",
    ),
    (
        &["green computing", "hijau"],
        "Green Computing means using computers in an environmentally responsible way: \
         reducing energy use, minimizing e-waste, optimizing system efficiency and using renewable energy.",
    ),
    (
        &["energy", "energi", "power", "hemat"],
        "To save energy: use sleep or hibernate, lower screen brightness, close unused \
         applications, pick energy-efficient hardware and prefer SSDs over HDDs.",
    ),
    (
        &["carbon", "emission", "emisi"],
        "The IT carbon footprint comes from device energy use, hardware production and data \
         centers. Reduce it with efficient cloud services, optimized code and renewable-powered providers.",
    ),
    (
        &["help", "bantu", "tolong"],
        "Sure! Even offline I can help with Green Computing basics, energy efficiency tips, \
         carbon footprint estimates and sustainable programming.",
    ),
];

/// Keyword-matched reply for a message the backend could not answer.
pub fn offline_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    TOPICS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, reply)| reply.to_string())
        .unwrap_or_else(|| {
            format!(
                "I understand you're asking about \"{message}\". I'm in offline mode, but you can \
                 ask me about energy efficiency, carbon footprint or sustainable computing."
            )
        })
}

/// Tutor text from a chat response, which nests it under `data` in newer backends.
pub fn reply_text(response: &Value) -> Option<&str> {
    response
        .pointer("/data/aria_response")
        .or_else(|| response.get("aria_response"))
        .and_then(Value::as_str)
}
