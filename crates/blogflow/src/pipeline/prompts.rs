//! Prompt and agent-task text for every stage.

pub fn headline_search(topic: &str) -> String {
    format!(
        "You have access to Google Search. Find the latest trending news about \"{topic}\" from today.\n\
         Extract the top 5 distinct news headlines from the search results.\n\
         Return ONLY the headlines, one per line. Do not include introductory text."
    )
}

pub fn research(headline: &str) -> String {
    format!(
        "Research the following topic in depth: \"{headline}\".\n\
         Provide a comprehensive summary including:\n\
         1. Key details and context.\n\
         2. Analysis and expert opinions.\n\
         3. Recent developments.\n\n\
         Use Google Search to ensure up-to-date and accurate information."
    )
}

pub fn standard_writer(headline: &str, research: &str) -> String {
    format!(
        "You are an expert tech blogger. Write a comprehensive, engaging blog post about: \"{headline}\".\n\n\
         Use the following research data to ensure accuracy:\n\
         {research}\n\n\
         Format the blog post in Markdown with:\n\
         - Catchy Title\n\
         - Introduction\n\
         - Key Takeaways (Bullet points)\n\
         - In-depth Analysis\n\
         - Conclusion\n\n\
         Tone: Professional yet accessible."
    )
}

pub fn technical_writer(research: &str) -> String {
    format!(
        "You are an expert Technical Blog Writer Agent.\n\
         Write a complete, high-quality technical blog post based strictly on this research:\n\n\
         {research}\n\n\
         Format:\n\
         - Markdown (headers, code blocks if needed)\n\
         - Engaging Title\n\
         - Introduction\n\
         - Technical Depth\n\
         - Conclusion\n\n\
         Do not mention 'Based on the research'. Just write the blog."
    )
}

pub fn content_selector(ideas: &[String]) -> String {
    let listed: String = ideas.iter().map(|idea| format!("- {}\n", idea)).collect();
    format!(
        "You are a Content Strategy Agent.\n\
         Here is a list of potential blog topics/titles found on the web:\n\
         {listed}\n\
         Select the top 3-5 most engaging, technical, and relevant ideas for an implementation-focused AI blog.\n\
         Return ONLY a JSON array of strings. Do not explain.\n\
         Example: [\"Idea 1\", \"Idea 2\"]"
    )
}

pub fn transcript_extraction(transcript: &str) -> String {
    format!(
        "You are an AI assistant analyzing the full result of a browser automation agent run.\n\
         Given the full execution result below, extract and return only the final output of the agent, \
         typically the extracted content it was asked to print.\n\
         Execution Result: {transcript}\n\
         Respond with just the final output content. No prefix text. No suffix text."
    )
}

pub fn publish_task(url: &str, title: &str, content: &str) -> String {
    format!(
        "1. Go to {url}\n\
         2. Wait for the page to load.\n\
         3. Type \"{title}\" into the title field.\n\
         4. Paste the following article into the main story area:\n\n\
         {content}"
    )
}

pub fn draft_task(url: &str, blog_post: &str) -> String {
    format!(
        "go to {url} and login with email and password then click on create post and paste the article below:\n\n{blog_post}"
    )
}

/// Title for the publish form: the first line with `#` removed, or
/// `fallback` when that is empty.
pub fn extract_title(blog_post: &str, fallback: &str) -> String {
    let title = blog_post
        .lines()
        .next()
        .unwrap_or_default()
        .replace('#', "")
        .trim()
        .to_string();
    if title.is_empty() {
        fallback.to_string()
    } else {
        title
    }
}
