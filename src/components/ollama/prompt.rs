use crate::config::Profile;
use crate::utils::time::{example_timestamp, format_long_date};
use chrono::DateTime;
use chrono_tz::Tz;

const RULES: &[&str] = &[
    "When listing events, ONLY mention the actual events shown above. Do not make up events.",
    "Format your response with each event on a new line using bullet points.",
    "When the user mentions a date without specifying a year, determine the correct year based on the current date.",
    "For dates: If the mentioned date has already passed this year, use next year. If it's in the future, use this year.",
    "Respond to the name \"{assistant}\" and be friendly, but be professional and slightly casual in your interactions.",
    "Remember that you're talking to {user} and can use their name naturally in conversation.",
];

/// System prompt for one turn: identity, today's date, real events, rules and the reply schema
pub fn build_system_prompt(profile: &Profile, now: &DateTime<Tz>, events_text: &str) -> String {
    let assistant = &profile.assistant_name;
    let user = &profile.user_name;

    let mut prompt = format!(
        "You are \"{assistant}\", an intelligent calendar assistant that manages {user}'s Google Calendar and also answers any other general questions they may have.\n"
    );

    if !profile.about.is_empty() {
        prompt.push_str(&format!("\nABOUT {user}:\n"));
        for fact in &profile.about {
            prompt.push_str(&format!("- {fact}\n"));
        }
    }

    prompt.push_str(&format!("\nYOUR IDENTITY:\n- Your name is {assistant}\n"));
    if !profile.assistant_expansion.is_empty() {
        prompt.push_str(&format!("- {assistant} stands for {}\n", profile.assistant_expansion));
    }
    prompt.push_str(&format!(
        "- You are a personal assistant for {user}\n- You should be friendly and helpful while being professional\n"
    ));

    prompt.push_str(&format!(
        "\nTODAY'S DATE: {}\n\nACTUAL CALENDAR EVENTS:\n{events_text}\n",
        format_long_date(now.date_naive())
    ));

    let rules = RULES
        .iter()
        .map(|rule| rule.replace("{assistant}", assistant).replace("{user}", user))
        .chain(profile.extra_rules.iter().cloned())
        .enumerate()
        .map(|(index, rule)| format!("{}. {}", index + 1, rule))
        .collect::<Vec<_>>()
        .join("\n");
    prompt.push_str(&format!("\nIMPORTANT RULES:\n{rules}\n"));

    prompt.push_str(&format!(
        r#"
Based on the user's input, respond naturally and output JSON for any calendar action.
Your response should be in this exact JSON format:
{{
    "action": "create|update|delete|list|chat",
    "summary": "Event title",
    "start_time": "ISO datetime (e.g., {start_example})",
    "end_time": "ISO datetime (e.g., {end_example})",
    "reply": "Your natural language response"
}}

If the user asks to list events, use "action": "list" and format your reply naturally using ONLY the actual events above with each event on a new line.
If no calendar action is needed, use "action": "chat".
"#,
        start_example = example_timestamp(now, 11),
        end_example = example_timestamp(now, 14),
    ));

    prompt
}
