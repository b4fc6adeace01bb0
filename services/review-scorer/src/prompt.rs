use shared::dto::ReviewRecord;

const INSTRUCTIONS: &str = "You are a food delivery service and you have to predict the rating of the food and the delivery of a review. \
I will pass you a list of reviews, the reviews can be positive or negative \
and you will have to tell me the rating to be given to the food (an integer number between 1 and 5) \
and the rating to be given to the delivery (an integer number between 1 and 5). \
Finally, you will have to tell me if the review is accepted or rejected with a float number between 0 and 1 representing confidence in accepting the review. \
Reject the reviews if they are found to be offensive or contain hate. \
Pay attention, some reviews may be negatives about the user experience with the restaurant but still they can be accepted since they are not offensive. \
Your answer must be in the JSON format, with a string for the ID as key and as value the food_rating, delivery_rating, and confidence. Don't write other information. \
example of your answer: {\"1\": [5, 5, 0.69], \"2\": [1, 1, 1.0], \"3\": [1, 1, 0.2]}.\n\
do not write any comments in the JSON, just the keys and values.\n\
Below I will write a list of reviews and their IDs, you have to predict the values.\n\n";

/// Build the prompt for one batch: fixed instructions followed by one
/// `ID: <id> Review: <text>` line per record, in order.
pub fn build_prompt(records: &[ReviewRecord]) -> String {
    let mut prompt = String::from(INSTRUCTIONS);
    for record in records {
        prompt.push_str(&format!(
            "ID: {} Review: {}\n",
            record.id,
            record.review.as_deref().unwrap_or("")
        ));
    }
    prompt
}

/// Split records into ordered batches of at most `max` records.
///
/// `max == 0` keeps everything in a single batch.
pub fn batches(records: &[ReviewRecord], max: usize) -> Vec<&[ReviewRecord]> {
    if records.is_empty() {
        return Vec::new();
    }
    if max == 0 {
        return vec![records];
    }
    records.chunks(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, review: Option<&str>) -> ReviewRecord {
        ReviewRecord {
            id,
            review: review.map(str::to_string),
            food_rating: Some("3".into()),
            delivery_rating: Some("3".into()),
            acceptance_score: Some("0.5".into()),
        }
    }

    #[test]
    fn one_line_per_review_in_order() {
        let records = vec![
            record(1, Some("great food")),
            record(2, Some("late again")),
            record(3, None),
        ];
        let prompt = build_prompt(&records);
        assert!(prompt.starts_with(INSTRUCTIONS));
        let lines: Vec<&str> = prompt[INSTRUCTIONS.len()..].lines().collect();
        assert_eq!(
            lines,
            vec![
                "ID: 1 Review: great food",
                "ID: 2 Review: late again",
                "ID: 3 Review: ",
            ]
        );
    }

    #[test]
    fn instructions_demand_json_only_answers() {
        let prompt = build_prompt(&[]);
        assert!(prompt.contains("{\"1\": [5, 5, 0.69]"));
        assert!(prompt.contains("Don't write other information"));
        assert!(prompt.contains("offensive or contain hate"));
    }

    #[test]
    fn identical_input_gives_identical_prompt() {
        let records = vec![record(1, Some("ok")), record(2, Some("fine"))];
        assert_eq!(build_prompt(&records), build_prompt(&records.clone()));
    }

    #[test]
    fn batches_respect_maximum() {
        let records: Vec<_> = (1..=5).map(|id| record(id, Some("r"))).collect();
        let split = batches(&records, 2);
        assert_eq!(split.len(), 3);
        assert_eq!(split[0].iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(split[2].iter().map(|r| r.id).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn zero_maximum_means_single_batch() {
        let records: Vec<_> = (1..=120).map(|id| record(id, Some("r"))).collect();
        assert_eq!(batches(&records, 0).len(), 1);
        assert!(batches(&[], 0).is_empty());
        assert!(batches(&[], 10).is_empty());
    }
}
