use super::*;

fn assert_elapsed(started: Instant, expected: Duration) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(5),
        "elapsed {elapsed:?}, expected about {expected:?}"
    );
}

async fn assert_silent(intents: &mut QueryIntents) {
    let next = time::timeout(Duration::from_secs(5), intents.next()).await;
    assert!(next.is_err(), "unexpected intent: {next:?}");
}

#[tokio::test(start_paused = true)]
async fn rapid_input_collapses_into_the_last_value() {
    let (sender, mut intents) = debounced_queries(DEFAULT_DEBOUNCE);
    let started = Instant::now();

    sender.push("a");
    time::sleep(Duration::from_millis(100)).await;
    sender.push("ab");
    time::sleep(Duration::from_millis(100)).await;
    sender.push("abc");

    let intent = intents.next().await.expect("intent");
    assert_eq!(
        intent,
        QueryIntent {
            seq: 1,
            text: "abc".to_string()
        }
    );
    assert_elapsed(started, Duration::from_millis(500));
    assert_silent(&mut intents).await;
}

#[tokio::test(start_paused = true)]
async fn settled_inputs_are_emitted_in_order_with_increasing_seq() {
    let (sender, mut intents) = debounced_queries(DEFAULT_DEBOUNCE);

    sender.push("fr");
    time::sleep(Duration::from_millis(400)).await;
    sender.push("fra");
    time::sleep(Duration::from_millis(400)).await;

    let first = intents.next().await.expect("first");
    let second = intents.next().await.expect("second");
    assert_eq!((first.seq, first.text.as_str()), (1, "fr"));
    assert_eq!((second.seq, second.text.as_str()), (2, "fra"));
}

#[tokio::test(start_paused = true)]
async fn value_equal_to_last_emission_is_suppressed() {
    let (sender, mut intents) = debounced_queries(DEFAULT_DEBOUNCE);

    sender.push("spain");
    assert_eq!(intents.next().await.expect("intent").text, "spain");

    // Typing away and back within one quiet period resolves to the same text.
    sender.push("spai");
    time::sleep(Duration::from_millis(50)).await;
    sender.push("spain");
    assert_silent(&mut intents).await;

    sender.push("spain");
    assert_silent(&mut intents).await;
}

#[tokio::test(start_paused = true)]
async fn initial_empty_text_is_not_emitted() {
    let (sender, mut intents) = debounced_queries(DEFAULT_DEBOUNCE);

    sender.push("");
    assert_silent(&mut intents).await;
    sender.clear();
    assert_silent(&mut intents).await;
}

#[tokio::test(start_paused = true)]
async fn clear_bypasses_debounce_and_cancels_pending_input() {
    let (sender, mut intents) = debounced_queries(DEFAULT_DEBOUNCE);

    sender.push("peru");
    assert_eq!(intents.next().await.expect("intent").text, "peru");

    sender.push("perus");
    let cleared_at = Instant::now();
    sender.clear();

    let intent = intents.next().await.expect("clear intent");
    assert_eq!(intent.text, "");
    assert!(intent.is_blank());
    assert_eq!(intent.seq, 2);
    assert_eq!(cleared_at.elapsed(), Duration::ZERO);

    assert_silent(&mut intents).await;
}

#[tokio::test(start_paused = true)]
async fn typed_empty_text_after_a_search_is_debounced() {
    let (sender, mut intents) = debounced_queries(DEFAULT_DEBOUNCE);

    sender.push("chile");
    assert_eq!(intents.next().await.expect("intent").text, "chile");

    let started = Instant::now();
    sender.push("");
    let intent = intents.next().await.expect("empty intent");
    assert!(intent.is_blank());
    assert_elapsed(started, DEFAULT_DEBOUNCE);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_output_stops_the_task() {
    let (sender, intents) = debounced_queries(DEFAULT_DEBOUNCE);
    drop(intents);
    time::sleep(Duration::from_millis(1)).await;

    assert!(!sender.push("anything"));
}

#[tokio::test(start_paused = true)]
async fn intents_can_be_consumed_as_a_stream() {
    use futures::StreamExt;

    let (sender, intents) = debounced_queries(DEFAULT_DEBOUNCE);
    sender.push("a");
    time::sleep(Duration::from_millis(400)).await;
    sender.push("b");
    time::sleep(Duration::from_millis(400)).await;
    drop(sender);

    let texts: Vec<String> = intents.map(|intent| intent.text).collect().await;
    assert_eq!(texts, vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn whitespace_only_differences_are_not_new_queries() {
    let (sender, mut intents) = debounced_queries(DEFAULT_DEBOUNCE);

    sender.push(" spain ");
    assert_eq!(intents.next().await.expect("intent").text, "spain");

    sender.push("spain  ");
    assert_silent(&mut intents).await;

    sender.push("   ");
    let intent = intents.next().await.expect("blank intent");
    assert_eq!(intent.text, "");
    assert_eq!(intent.seq, 2);
}
