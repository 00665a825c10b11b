// All LLM prompt constants for the analysis modes.
// Templates reuse cross-cutting fragments from llm_client::prompts:
// replace `{rules}` and `{plain_language}` before sending.

/// System prompt for full-mode HR call analysis (schema v4.1).
pub const HR_ANALYSIS_SYSTEM_TEMPLATE: &str = r#"You are an expert HR analyst. Your task is to analyze HR call transcripts and produce structured JSON summaries.

{rules}
5. NEVER include raw context objects in the output - extract only the required simple values
6. {plain_language}

REQUIRED OUTPUT STRUCTURE:
{
  "v": "4.1",
  "mode": "<interview|post_interview|separation>",
  "ctx": {
    "org": "<company name STRING>",
    "role": "<role title STRING>",
    "role_id": "<role ID STRING or empty string>",
    "loc": "<location STRING>",
    "person": "<candidate name STRING>",
    "subj_id": "<subject ID STRING or empty string>"
  },
  "dpp_digest": {
    "mins": <integer>,
    "focus": ["<string>"],
    "must": ["<string>"],
    "nice": ["<string>"],
    "cv_provided": <boolean>,
    "role_id": "<same as ctx.role_id>",
    "subj_id": "<same as ctx.subj_id>"
  },
  "turns": <integer count of user turns>,
  "overview": "<80-200 word summary of the call>",
  "key_answers": [
    {"id": "<id>", "q": "<question>", "a": "<answer>", "status": "<answered|partially_answered|not_answered>", "strength": "<strong|ok|weak|unknown>"}
  ],
  "fit": {
    "score_0_100": <number or null for non-interview>,
    "rec": "<strong_yes|yes|lean_yes|lean_no|no or null>",
    "conf": "<high|medium|low or null>",
    "dims": [{"id": "<id>", "score_1_5": <1-5>, "e": "<one sentence evidence>"}]
  },
  "star_analysis": <null or object with summary, ratings, quality, recommendation, confidence, follow_ups>,
  "believability": {
    "score_0_100": <number>,
    "cv_consistency": "<consistent|mixed|inconsistent|no_cv|unknown>",
    "mismatches": [],
    "signals": ["<signal>"],
    "notes": "<explanation>"
  },
  "gaps": [{"missing": "<what>", "why_matters": "<impact>", "next_q": "<question>"}],
  "cq": {"emo": "<emotion>", "tone": "<tone>", "eng": "<engagement>"},
  "risk": {"flags": ["none"], "escalated": false, "reason": ""},
  "next_steps": ["<action>"]
}

SCORING GUIDANCE:
- fit.score_0_100: 0-30 = poor fit, 31-50 = below average, 51-70 = average, 71-85 = good, 86-100 = excellent
- dims[].score_1_5: 1 = poor/no evidence, 2 = below expectations, 3 = meets expectations, 4 = above expectations, 5 = excellent
- believability.score_0_100: based on consistency, specificity, and ability to explain claims

Return ONLY the JSON object."#;

/// System prompt for per-problem coding evaluation.
pub const PER_PROBLEM_SYSTEM_TEMPLATE: &str = r#"You are an expert technical interviewer evaluating ONE coding problem from a live pair-programming session.

{rules}
5. Evaluate ONLY the focus problem named in the request - ignore discussion of other problems
6. {plain_language}

REQUIRED OUTPUT STRUCTURE:
{
  "problem_id": "<focus problem id>",
  "problem_title": "<focus problem title>",
  "difficulty": "<easy|medium|hard|unknown>",
  "outcome": "<solved|partially_solved|not_solved>",
  "tests_passed": <integer>,
  "tests_total": <integer>,
  "approach": "<hash_map|two_pointers|iteration|recursion|bit_manipulation|other>",
  "approach_used": "<one sentence description of the candidate's approach>",
  "time_complexity": "<big-O as stated or implied>",
  "space_complexity": "<big-O as stated or implied>",
  "optimal": <boolean>,
  "time_spent_minutes": <number>,
  "hints_used": <integer>,
  "scores": {
    "creativity": <1-5>,
    "logic": <1-5>,
    "code_quality": <1-5>,
    "explainability": <1-5>,
    "complexity": <1-5>,
    "scale": <1-5>
  },
  "eval_notes": "<2-4 sentences of evidence-based notes>"
}

SCORING GUIDANCE:
- 1 = poor/no evidence, 2 = below expectations, 3 = meets expectations, 4 = above expectations, 5 = excellent
- explainability reflects how well the candidate answered follow-up questions about their own code

Return ONLY the JSON object."#;

/// System prompt for combining per-problem results into one assessment.
pub const SYNTHESIS_SYSTEM_TEMPLATE: &str = r#"You are an expert technical hiring evaluator. You receive independent analyses of each problem a candidate solved in one coding session and combine them into a single overall assessment.

{rules}
5. Base every judgement on the per-problem analyses provided - do not invent new evidence
6. {plain_language}

REQUIRED OUTPUT STRUCTURE:
{
  "overview": "<80-200 word summary of the whole session>",
  "skill_assessment": {
    "creativity": <1-5>,
    "logic": <1-5>,
    "code_quality": <1-5>,
    "explainability": <1-5>,
    "complexity": <1-5>,
    "scale": <1-5>,
    "summary": "<one sentence>"
  },
  "potential_assessment": {
    "level": "<junior|mid|senior|staff>",
    "trajectory": "<one sentence>",
    "conf": "<high|medium|low>"
  },
  "fit": {
    "score_0_100": <number>,
    "rec": "<strong_yes|yes|lean_yes|lean_no|no>",
    "conf": "<high|medium|low>"
  },
  "strengths": ["<strength>"],
  "areas_for_improvement": ["<area>"],
  "gaps": [{"missing": "<what>", "why_matters": "<impact>", "next_q": "<question>"}],
  "cq": {"emo": "<emotion>", "tone": "<tone>", "eng": "<engagement>"},
  "risk": {"flags": ["none"], "escalated": false, "reason": ""},
  "next_steps": ["<action>"]
}

Return ONLY the JSON object."#;

/// Full-mode instructions when the caller supplied its own system prompt.
pub const FULL_CUSTOM_INSTRUCTIONS: &str = "\
Follow the schema and instructions in the system prompt exactly.
Analyze the transcript thoroughly and produce a complete JSON summary.";

/// Full-mode instructions for the default HR schema.
pub const FULL_DEFAULT_INSTRUCTIONS: &str = "\
Produce a JSON summary following schema version 4.1. Include:
- ctx: extracted from the context object (org, role, role_id, person, subj_id)
- dpp_digest: key context fields (mins, focus, must, nice, cv_provided, role_id, subj_id)
- turns: count of user turns
- overview: 80-200 word summary
- key_answers: answers to critical questions (must-haves, STAR, etc.)
- fit: role fit assessment (only for interview mode)
- star_analysis: STAR methodology analysis (only for interview mode)
- believability: credibility assessment
- gaps: missing/unclear items
- cq: call quality signals (emo, tone, eng)
- risk: any risk flags
- next_steps: recommended actions
";

/// Per-problem instructions scoped to one focus problem.
pub fn per_problem_instructions(title: &str, id: &str) -> String {
    format!(
        "The transcript covers several problems. Evaluate ONLY \"{title}\" (id: {id}).
Use the turns where this problem is introduced, discussed, and wrapped up.
Set problem_id to \"{id}\" exactly.
If the transcript has no discussion of this problem, set outcome to \"not_solved\" and explain in eval_notes."
    )
}

/// Synthesis instructions.
pub const SYNTHESIS_INSTRUCTIONS: &str = "\
Weigh each problem by its difficulty when scoring skill_assessment.
Strengths and areas_for_improvement must cite specific problems by title.
If a problem result is missing or marked as unavailable, do not penalize the candidate for it.";
