//! Fixed benchmark input: a recorded four-problem coding session.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Number of leading turns sent by the warmup call.
const WARMUP_TURNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Static problem descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub difficulty: String,
}

impl Problem {
    pub fn new(id: &str, title: &str, difficulty: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            difficulty: difficulty.to_string(),
        }
    }
}

/// Everything a pipeline run sends: transcript, problems and context object.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub transcript: Vec<Turn>,
    pub problems: Vec<Problem>,
    pub dpp: Value,
}

impl Fixture {
    /// The recorded session: 53 turns across Two Sum, Valid Palindrome,
    /// Reverse Linked List and Fizz Buzz.
    pub fn coding_session() -> Self {
        let problems = vec![
            Problem::new("two-sum", "Two Sum", "easy"),
            Problem::new("valid-palindrome", "Valid Palindrome", "easy"),
            Problem::new("reverse-linked-list", "Reverse Linked List", "medium"),
            Problem::new("fizz-buzz", "Fizz Buzz", "easy"),
        ];

        let dpp = json!({
            "mode": "coding_challenge",
            "session": {"elapsed_minutes": 6, "total_problems": problems.len(), "hints_given": 0},
            "live_code": {"language": "python"},
            "candidate": {"first_name": "Zohar", "full_name": "Zohar Babin"},
            "all_problems_in_session": problems,
        });

        let transcript = SESSION_TURNS
            .iter()
            .map(|(role, content)| Turn {
                role: *role,
                content: content.to_string(),
            })
            .collect();

        Self {
            transcript,
            problems,
            dpp,
        }
    }

    /// Phase-1 body: the whole transcript focused on one problem.
    pub fn per_problem_payload(&self, problem: &Problem) -> Value {
        self.focused_payload(&self.transcript, problem)
    }

    /// Phase-2 body: the collected per-problem summaries.
    pub fn synthesis_payload(&self, problem_results: Vec<Value>) -> Value {
        json!({
            "analysis_mode": "synthesis",
            "problem_results": problem_results,
            "dpp": self.dpp,
        })
    }

    /// A short per-problem call used to wake the endpoint before timing starts.
    pub fn warmup_payload(&self) -> Option<Value> {
        let problem = self.problems.first()?;
        let turns = &self.transcript[..self.transcript.len().min(WARMUP_TURNS)];
        Some(self.focused_payload(turns, problem))
    }

    fn focused_payload(&self, transcript: &[Turn], problem: &Problem) -> Value {
        json!({
            "analysis_mode": "per_problem",
            "transcript": transcript,
            "problem_focus": problem,
            "dpp": self.dpp,
        })
    }
}

const SESSION_TURNS: &[(Role, &str)] = &[
    (Role::Assistant, r#"Hey, I'm an AI Peer Programming Specialist. How are you doing today?"#),
    (Role::User, r#"Awesome, what's up?"#),
    (Role::Assistant, r#"I'm doing great, thanks! I'm ready to help you with your coding challenge. We'll be working on a problem called "Two Sum" today. Take your time to read the problem description, and let me know when you're ready to start coding."#),
    (Role::User, r#"Done."#),
    (Role::Assistant, r#"Nice work—all tests passing on Two Sum! Can you walk me through how your code handles the case where the `target` is found using the very first number in the `nums` array?"#),
    (Role::User, r#"Because the problem is saying you may only use the same. There's no usage of the same element twice, this is never going to be a problem."#),
    (Role::Assistant, r#"That's a good point about the problem constraints. How does your code ensure that it doesn't use the same element twice, even if the complement happens to be the number itself?"#),
    (Role::User, r#"Because I have a dictionary."#),
    (Role::Assistant, r#"You're right, the `seen` dictionary is key here. What is the time complexity of this solution, and what part of your code primarily determines it?"#),
    (Role::User, r#"It's O of n and it's because we looped through the entire array."#),
    (Role::Assistant, r#"That's correct; the `for` loop makes it O(n) time complexity. Given that you're storing elements in the `seen` dictionary, what would you say is the space complexity of your solution?"#),
    (Role::User, r#"Who have been?"#),
    (Role::Assistant, r#"The space complexity refers to the amount of memory your solution uses. In your code, you're using the `seen` dictionary to store elements. How does the size of this dictionary relate to the input `nums` array, and what does that imply for the space complexity?"#),
    (Role::User, r#"It's O-O-N."#),
    (Role::Assistant, r#"That's right, it's O(n) for space complexity. Great job on Two Sum! That was problem one of four. Switching to the next challenge now."#),
    (Role::User, r#"Done."#),
    (Role::Assistant, r#"Alright, here's Valid Palindrome. Take your time."#),
    (Role::User, r#"Done done."#),
    (Role::Assistant, r#"Nice work—all tests passing on Valid Palindrome! Can you explain the purpose of your two `if` conditions inside the `while` loop, specifically why `continue` is used in those cases?"#),
    (Role::User, r#"Sure, because I'm basically testing if the - Sure, because I'm basically testing if the... if one of the pointers is either right or left is If one of the pointers is either right or left is Um, not an alphanumeric And if it is, we're just skipping."#),
    (Role::Assistant, r#"That's a clear explanation of their function. What is the time complexity of this solution, and what operation within your code dictates it?"#),
    (Role::User, r#"It's O of N because of the loop going through the entire string."#),
    (Role::Assistant, r#"That's correct, the single pass through the string makes it O(n) time complexity. What about the space complexity for this approach, Zohar?"#),
    (Role::User, r#"It's O of 1 because we don't store anything. We just have two pointers."#),
    (Role::Assistant, r#"That's right, it's O(one) space complexity because you're only using a few variables for the pointers, regardless of the input string's size. Great job on Valid Palindrome! That was problem two of four. Switching to the next challenge now."#),
    (Role::User, r#"Time completed."#),
    (Role::Assistant, r#"Alright, here's Reverse Linked List. Take your time."#),
    (Role::User, r#"I finished."#),
    (Role::Assistant, r#"Nice work—all tests passing on Reverse Linked List! Can you explain how the `prev` and `curr` pointers are updated within the loop to correctly reverse the links?"#),
    (Role::User, r#"I basically have three pointers, one, two, current, previous and next, and then in every duration I switch between next and previous."#),
    (Role::Assistant, r#"That's a good high-level overview. Could you elaborate on why it's important to store `curr.next` in a `next_node` variable before changing `curr.next` to `prev`?"#),
    (Role::User, r#"because otherwise they'll confuse the pointers."#),
    (Role::Assistant, r#"That's right, it prevents losing the reference to the rest of the list. What is the time complexity of this solution, and what part of your code determines it?"#),
    (Role::User, r#"O of n because we're in a loop looping through the entire list."#),
    (Role::Assistant, r#"That's correct, iterating through the list once makes it O(n) time complexity. What about the space complexity for this solution, Zohar?"#),
    (Role::User, r#"2 of 1 because I only have 3 pointers."#),
    (Role::Assistant, r#"That's right, it's O(one) space complexity because you're only using a constant number of pointers regardless of the list's size. Great job on Reverse Linked List! That was problem three of four. Switching to the next challenge now."#),
    (Role::User, r#"Finished."#),
    (Role::Assistant, r#"Alright, here's Fizz Buzz. Take your time."#),
    (Role::User, r#"Finished."#),
    (Role::Assistant, r#"Nice work—all tests passing on Fizz Buzz! Can you explain how your bit manipulation approach with the `mask` variable correctly determines "Fizz", "Buzz", or "FizzBuzz" for each number?"#),
    (Role::User, r#"Yeah, I basically have a mask of fizzbuzz. and then I loop through the string And then I'm basically testing each part If it's divisible by three or divisible by five, and if yes, then... I opened it and then uh That's the last final point. That's it."#),
    (Role::Assistant, r#"You're using a `mask` to encode the FizzBuzz pattern. How does the `code` variable, derived from shifting and masking, map to the `words` array to get the correct output string?"#),
    (Role::User, r#"I'm not sure I understood the question."#),
    (Role::Assistant, r#"Let me rephrase. After you extract the `code` using `(mask >> (two * ((i - one) % fifteen))) & three`, how does that specific `code` value (zero, one, two, or three) tell your program whether to append "Fizz", "Buzz", "FizzBuzz", or the number itself?"#),
    (Role::User, r#"based on the words array."#),
    (Role::Assistant, r#"Indeed, the `words` array is crucial for that mapping. What is the time complexity of this solution, and which part of your code primarily determines it?"#),
    (Role::User, r#"O of n because of the for loop."#),
    (Role::Assistant, r#"That's correct, the `for` loop iterating up to `n` makes it O(n) time complexity. What would you say is the space complexity of your solution, Zohar?"#),
    (Role::User, r#"One."#),
    (Role::Assistant, r#"Could you elaborate on why you believe the space complexity is O(one), considering you're building an `answer` list that grows with `n`?"#),
    (Role::User, r#"No, actually it's O of N because I have an array, answer array."#),
    (Role::Assistant, r#"That's right, the `answer` array growing with `n` makes the space complexity O(n). Excellent! You've completed all four problems. Great work today! Ending the session now."#),
];
