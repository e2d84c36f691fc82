//! End-to-end protocol scenarios, driven over a real TCP connection against
//! a server bound to `127.0.0.1:0`.

mod support;

use support::{start_board, start_default_board, TestClient};

#[tokio::test]
async fn handshake_matches_configured_board() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(
        client.read_handshake().await,
        [
            "BOARD 10 10".to_string(),
            "NOTE 2 2".to_string(),
            "COLORS BLUE RED WHITE".to_string(),
            "OK READY".to_string(),
        ]
    );
}

#[tokio::test]
async fn post_then_query_by_message_substring() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("POST 0 0 red Hello world").await;
    assert_eq!(client.read_line().await, "OK POSTED 1");

    client.send("GET refersTo=hello").await;
    assert_eq!(
        client.read_block().await,
        vec!["NOTE 1 0 0 RED UNPINNED Hello world"]
    );
}

#[tokio::test]
async fn overlap_is_rejected() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("POST 0 0 red Hello world").await;
    assert_eq!(client.read_line().await, "OK POSTED 1");

    client.send("POST 0 0 blue Again").await;
    assert_eq!(
        client.read_line().await,
        "ERROR OVERLAP_ERROR Complete overlap not allowed with note id=1"
    );
}

#[tokio::test]
async fn out_of_bounds_is_rejected() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("POST 9 0 blue X").await;
    let reply = client.read_line().await;
    assert!(reply.starts_with("ERROR OUT_OF_BOUNDS"));
}

#[tokio::test]
async fn pin_protects_a_note_from_shake() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("POST 4 4 white Keep me").await;
    assert_eq!(client.read_line().await, "OK POSTED 1");

    client.send("PIN 5 5").await;
    assert_eq!(client.read_line().await, "OK PINNED 5 5");

    client.send("POST 0 0 red Drop me").await;
    assert_eq!(client.read_line().await, "OK POSTED 2");

    client.send("SHAKE").await;
    assert_eq!(client.read_line().await, "OK SHAKEN REMOVED 1");

    client.send("GET").await;
    assert_eq!(
        client.read_block().await,
        vec!["NOTE 1 4 4 WHITE PINNED Keep me"]
    );
}

#[tokio::test]
async fn invalid_color_in_get_filter_is_rejected() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("GET color=green").await;
    assert_eq!(
        client.read_line().await,
        "ERROR INVALID_COLOR Invalid color: GREEN"
    );
}

#[tokio::test]
async fn disconnect_replies_bye_then_closes() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("DISCONNECT").await;
    assert_eq!(client.read_line().await, "OK BYE");
}

#[tokio::test]
async fn malformed_command_does_not_end_the_session() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("FROBNICATE").await;
    assert!(client.read_line().await.starts_with("ERROR INVALID_FORMAT"));

    // The session is still alive and accepts the next command.
    client.send("SHAKE").await;
    assert_eq!(client.read_line().await, "OK SHAKEN REMOVED 0");
}

#[tokio::test]
async fn get_pins_survive_shake_sorted_by_y_then_x() {
    let (addr, _board) = start_default_board().await;
    let mut client = TestClient::connect(addr).await;
    client.read_handshake().await;

    client.send("POST 4 4 white Keep me").await;
    client.read_line().await;
    client.send("PIN 5 5").await;
    client.read_line().await;

    client.send("POST 0 0 red Also me").await;
    client.read_line().await;
    client.send("PIN 0 0").await;
    client.read_line().await;

    client.send("SHAKE").await;
    assert_eq!(client.read_line().await, "OK SHAKEN REMOVED 0");

    client.send("GET PINS").await;
    assert_eq!(
        client.read_block().await,
        vec!["PIN 0 0".to_string(), "PIN 5 5".to_string()]
    );
}

#[tokio::test]
async fn concurrent_shake_is_atomic_with_respect_to_get() {
    // Two sessions: one posts repeatedly, the other shakes repeatedly.
    // No GET should ever observe a note that is both unpinned and older
    // than the last completed SHAKE -- since SHAKE removes every unpinned
    // note in one atomic step, a GET right after a SHAKE reply should only
    // ever see notes posted after that SHAKE completed.
    let (addr, board) = start_default_board().await;

    let poster_board = board.clone();
    let poster = tokio::spawn(async move {
        for i in 0..50u32 {
            let x = (i % 5) * 2;
            let _ = poster_board.post(x, 0, "red", format!("note {i}"));
        }
    });

    let shaker_board = board.clone();
    let shaker = tokio::spawn(async move {
        for _ in 0..50 {
            shaker_board.shake();
            tokio::task::yield_now().await;
        }
    });

    let _ = tokio::join!(poster, shaker);

    // After everything settles, SHAKE leaves only pinned notes (there are
    // none pinned here), so the board should end up empty.
    board.shake();
    assert!(board
        .get_notes_filtered(&Default::default())
        .unwrap()
        .is_empty());
}
