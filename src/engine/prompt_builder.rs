use crate::model::progress_state::StatKey;

/// Builds the instruction sent to the oracle.
/// Formatting only: no parsing, no networking.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn oracle(narrative: &str) -> String {
        let mut prompt = String::new();

        push_system_role(&mut prompt);
        push_stat_guide(&mut prompt);
        push_report(&mut prompt, narrative);
        push_output_format(&mut prompt);

        prompt
    }
}

fn push_system_role(prompt: &mut String) {
    prompt.push_str(
        "Analyse this report as the System from Solo Leveling.\n\
You judge the effort a hunter reports and award experience for it.\n\
Award between 5 and 50 XP: routine effort earns little, exhausting or \
exceptional effort earns more. Pick the single stat the effort trained most.\n\n",
    );
}

fn push_stat_guide(prompt: &mut String) {
    prompt.push_str("STATS:\n");
    for key in StatKey::ALL {
        prompt.push_str(&format!("- {}: {}\n", key, stat_hint(key)));
    }
    prompt.push('\n');
}

fn stat_hint(key: StatKey) -> &'static str {
    match key {
        StatKey::Str => "strength, physical training",
        StatKey::Int => "study, reasoning, learning",
        StatKey::Sen => "perception, clinical sense, empathy",
        StatKey::Vit => "endurance, long shifts, recovery",
        StatKey::Est => "stability, discipline, emotional control",
    }
}

fn push_report(prompt: &mut String, narrative: &str) {
    prompt.push_str("REPORT:\n'");
    prompt.push_str(narrative.trim());
    prompt.push_str("'\n\n");
}

fn push_output_format(prompt: &mut String) {
    prompt.push_str(
        "Return JSON: {\"xp\": 10, \"stat\": \"STR\", \"msg\": \"message\"}\n\
xp is an integer, stat is one of STR, INT, SEN, VIT, EST, msg is one short \
line spoken by the System to the hunter.\n",
    );
}
