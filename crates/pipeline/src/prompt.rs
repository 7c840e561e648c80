//! Scoring prompt builder.
//!
//! Serializes a bounded set of candidate events, with their weather
//! annotations, into the judge's input. The instructions demand a bare
//! JSON array of `{id, score, reason}` — a contract the sanitizer assumes
//! holds only approximately.

use std::collections::HashMap;

use model::{EventRecord, ForecastRecord, UserRequest};

/// Upper bound on candidates in one scoring prompt. Enforced by
/// truncating the (date-ascending) candidate list, never by sampling.
pub const MAX_PROMPT_CANDIDATES: usize = 50;

/// System instructions for the scoring call.
pub fn scoring_instructions() -> &'static str {
    "You are an expert event recommendation engine. \
     Your primary job is to semantically match what the user is looking for \
     against each event's name and description. \
     Score each event 0-100 using this priority order:\n\
     1. SEMANTIC MATCH (most important): Does the event name/description align \
     with what the user asked for? Read the description carefully.\n\
     2. PRACTICAL FIT: Does the price fit the budget? Is the venue type \
     (indoor/outdoor) appropriate given the weather?\n\
     3. TIMING: Weekend events score slightly higher for leisure requests.\n\
     Give a 'reason' that explains specifically how the event matches or \
     mismatches the user's request. \
     Respond with ONLY a valid JSON array. No prose, no markdown, no code fences."
}

/// Build the user-side scoring prompt for up to
/// [`MAX_PROMPT_CANDIDATES`] events.
pub fn build_scoring_prompt(
    request: &UserRequest,
    events: &[EventRecord],
    forecasts: &HashMap<String, ForecastRecord>,
) -> String {
    let candidates = &events[..events.len().min(MAX_PROMPT_CANDIDATES)];

    let blocks: Vec<String> = candidates
        .iter()
        .map(|event| event_summary(event, forecasts.get(&event.date)))
        .collect();

    let budget = match request.budget_max {
        Some(max) => format!("${max:.0}"),
        None => "No limit".to_string(),
    };
    let venue = request
        .venue_preference
        .as_deref()
        .unwrap_or("No preference");

    format!(
        "User is looking for: \"{intent}\"\n\
         Budget max: {budget}\n\
         Date range: {start} to {end}\n\
         Venue preference: {venue}\n\n\
         Score each of the following {count} events based on how well they match \
         what the user described. Pay close attention to the Description field of \
         each event.\n\n\
         {blocks}\n\n\
         Respond with ONLY this JSON array:\n\
         [{{\"id\": \"...\", \"score\": <0-100>, \"reason\": \"one sentence explaining the semantic match\"}}, ...]",
        intent = request.intent,
        budget = budget,
        start = request.start_date,
        end = request.end_date,
        venue = venue,
        count = candidates.len(),
        blocks = blocks.join("\n\n---\n\n"),
    )
}

/// One candidate's text block in the scoring prompt.
fn event_summary(event: &EventRecord, weather: Option<&ForecastRecord>) -> String {
    let description = if event.description.trim().is_empty() {
        "No description available"
    } else {
        event.description.trim()
    };

    format!(
        "ID: {id}\n\
         Name: {name}\n\
         Description: {description}\n\
         Date: {date} ({day_type}) @ {time}\n\
         Venue: {venue} ({venue_type})\n\
         Category: {category} / {genre}\n\
         Price: {price}\n\
         Weather: {weather}",
        id = event.id,
        name = event.name,
        description = description,
        date = event.date,
        day_type = day_type(event.is_weekend),
        time = event.time,
        venue = event.venue_name,
        venue_type = venue_type(event.is_outdoor),
        category = event.category,
        genre = event.genre,
        price = format_price_range(event.price_min, event.price_max),
        weather = format_weather(weather),
    )
}

/// "$25-$60", or "Free/Unknown" when the catalog listed no prices.
pub fn format_price_range(price_min: f64, price_max: f64) -> String {
    if price_min > 0.0 || price_max > 0.0 {
        format!("${price_min:.0}-${price_max:.0}")
    } else {
        "Free/Unknown".to_string()
    }
}

/// One-line weather summary, or the fixed no-forecast marker.
pub fn format_weather(weather: Option<&ForecastRecord>) -> String {
    match weather {
        Some(w) => format!(
            "{}, {:.0}-{:.0}F, rain {:.0}%, outdoor_ok={}",
            w.description, w.temp_min_f, w.temp_max_f, w.precipitation_chance, w.is_suitable_outdoor
        ),
        None => "No forecast available".to_string(),
    }
}

pub fn day_type(is_weekend: bool) -> &'static str {
    if is_weekend { "Weekend" } else { "Weekday" }
}

pub fn venue_type(is_outdoor: bool) -> &'static str {
    if is_outdoor { "Outdoor" } else { "Indoor" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use model::flags;

    fn test_request() -> UserRequest {
        UserRequest {
            city: "New York".to_string(),
            region_code: Some("NY".to_string()),
            country_code: "US".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            intent: "jazz music indoor weekend".to_string(),
            venue_preference: None,
            budget_max: Some(100.0),
        }
    }

    fn test_event(id: &str, date: &str, venue: &str) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            name: format!("Event {id}"),
            description: String::new(),
            date: date.to_string(),
            time: "20:00".to_string(),
            venue_name: venue.to_string(),
            venue_address: String::new(),
            venue_city: "New York".to_string(),
            venue_region: "NY".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            price_min: 25.0,
            price_max: 60.0,
            category: "Music".to_string(),
            genre: "Jazz".to_string(),
            ticket_url: String::new(),
            image_url: String::new(),
            is_weekend: flags::is_weekend(date),
            is_outdoor: flags::is_outdoor(venue),
        }
    }

    #[test]
    fn test_prompt_lists_request_fields_and_candidates() {
        let events = vec![
            test_event("a", "2026-03-07", "Birdland Jazz Club"),
            test_event("b", "2026-03-04", "Liberty Park"),
        ];
        let prompt = build_scoring_prompt(&test_request(), &events, &HashMap::new());

        assert!(prompt.contains("jazz music indoor weekend"));
        assert!(prompt.contains("Budget max: $100"));
        assert!(prompt.contains("2026-03-01 to 2026-03-07"));
        assert!(prompt.contains("ID: a"));
        assert!(prompt.contains("ID: b"));
        assert!(prompt.contains("(Weekend) @ 20:00"));
        assert!(prompt.contains("Liberty Park (Outdoor)"));
        assert!(prompt.contains("No forecast available"));
        assert!(prompt.contains("ONLY this JSON array"));
    }

    #[test]
    fn test_prompt_truncates_to_candidate_cap() {
        let events: Vec<EventRecord> = (0..MAX_PROMPT_CANDIDATES + 20)
            .map(|i| test_event(&format!("evt-{i}"), "2026-03-03", "City Theatre"))
            .collect();
        let prompt = build_scoring_prompt(&test_request(), &events, &HashMap::new());

        // The cap keeps the head of the list and drops the tail
        assert!(prompt.contains(&format!("ID: evt-{}", MAX_PROMPT_CANDIDATES - 1)));
        assert!(!prompt.contains(&format!("ID: evt-{MAX_PROMPT_CANDIDATES}\n")));
        assert!(prompt.contains(&format!("following {MAX_PROMPT_CANDIDATES} events")));
    }

    #[test]
    fn test_prompt_includes_weather_when_present() {
        let events = vec![test_event("a", "2026-03-07", "City Theatre")];
        let mut forecasts = HashMap::new();
        forecasts.insert(
            "2026-03-07".to_string(),
            ForecastRecord {
                date: "2026-03-07".to_string(),
                temp_min_f: 40.0,
                temp_max_f: 55.0,
                description: "Clear sky".to_string(),
                precipitation_chance: 10.0,
                wind_speed_mph: 5.0,
                is_suitable_outdoor: true,
            },
        );
        let prompt = build_scoring_prompt(&test_request(), &events, &forecasts);

        assert!(prompt.contains("Clear sky, 40-55F, rain 10%, outdoor_ok=true"));
    }

    #[test]
    fn test_price_formatting() {
        assert_eq!(format_price_range(25.0, 60.0), "$25-$60");
        assert_eq!(format_price_range(0.0, 40.0), "$0-$40");
        assert_eq!(format_price_range(0.0, 0.0), "Free/Unknown");
    }
}
