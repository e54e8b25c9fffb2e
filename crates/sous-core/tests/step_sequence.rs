//! Ordering properties of `StepSequence` over every arrangement of a
//! small recipe.

use sous_core::{SessionError, Step, StepSequence};

fn permutations(items: &[u32]) -> Vec<Vec<u32>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for (i, &head) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

fn steps(numbers: &[u32]) -> Vec<Step> {
    numbers
        .iter()
        .map(|n| Step::new(*n, format!("instruction {n}")))
        .collect()
}

#[test]
fn every_input_order_yields_ascending_sequence() {
    let numbers = [4, 1, 9, 2, 7];
    let mut expected = numbers.to_vec();
    expected.sort_unstable();

    for order in permutations(&numbers) {
        let sequence = StepSequence::new(steps(&order)).unwrap();
        let got: Vec<u32> = sequence.iter().map(|s| s.step_number).collect();
        assert_eq!(got, expected, "input order {order:?}");
        assert_eq!(sequence.get(0).unwrap().step_number, 1);
    }
}

#[test]
fn position_of_matches_sorted_index() {
    let sequence = StepSequence::new(steps(&[30, 10, 20])).unwrap();
    for (index, number) in [10, 20, 30].into_iter().enumerate() {
        assert_eq!(sequence.position_of(number), Some(index));
        assert_eq!(sequence.find(number).unwrap().instruction, format!("instruction {number}"));
    }
    assert_eq!(sequence.position_of(15), None);
}

#[test]
fn duplicate_anywhere_is_rejected() {
    for order in permutations(&[1, 2, 3]) {
        let mut numbers = order.clone();
        numbers.push(order[1]);
        assert_eq!(
            StepSequence::new(steps(&numbers)).unwrap_err(),
            SessionError::DuplicateStepNumber(order[1])
        );
    }
}
