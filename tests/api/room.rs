use std::collections::HashMap;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;

use crate::helpers::test_app::TestApp;
use crate::helpers::test_room::{TestRoom, WsMessageIn};

fn citizen_other_than(impostor: usize, excluded: &[usize], players: usize) -> usize {
    (0..players)
        .find(|index| *index != impostor && !excluded.contains(index))
        .unwrap()
}

#[tokio::test]
async fn welcome_is_sent_when_connecting() {
    let app = TestApp::spawn_app().await;

    let player = app.connect_player("Ana").await;

    assert!(player.id.chars().all(|char| char.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let app = TestApp::spawn_app().await;
    let mut player = app.connect_player("Ana").await;

    player.assert_nothing_pending().await;
}

#[tokio::test]
async fn unprocessable_message_returns_error_and_keeps_connection() {
    let app = TestApp::spawn_app().await;
    let mut player = app.connect_player("Ana").await;

    player
        .send_message(Message::Text("{\"kind\":\"dance\"}".to_string()))
        .await;

    match player.receive().await.unwrap() {
        WsMessageIn::Error {
            r#type,
            title,
            detail,
        } => {
            assert_eq!(r#type, "UNPROCESSABLE_WEBSOCKET_MESSAGE");
            assert!(!title.is_empty());
            assert!(!detail.is_empty());
        }
        message => panic!("Expected an error, got {message:?}"),
    }
    player.assert_nothing_pending().await;
}

#[tokio::test]
async fn silent_connection_is_closed() {
    let app = TestApp::spawn_app_with_player_timeout(1).await;
    let mut player = app.connect_player("Ana").await;

    let result = player.receive_text().await;

    assert_eq!(result, Err("Websocket closed.".to_string()));
}

#[tokio::test]
async fn players_joining_see_the_roster_in_join_order() {
    let mut room = TestRoom::create("r1").await;

    room.add_player("Ana").await;
    room.add_player("Bea").await;
    let state = room.add_player("Carlos").await;

    assert_eq!(state.phase, "join");
    let names: Vec<&str> = state
        .players
        .iter()
        .map(|player| player.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ana", "Bea", "Carlos"]);
    assert!(state.players.iter().all(|player| player.alive));
    assert_eq!(state.players[0].id, room.player_id(0));
}

#[tokio::test]
async fn blank_room_id_joins_the_default_room() {
    let mut room = TestRoom::create_with_players("", &["Ana", "Bea", "Carlos"]).await;

    let impostor = room.start_round().await;

    assert!(impostor < 3);
}

#[tokio::test]
async fn start_round_with_two_players_is_ignored() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea"]).await;

    room.players[0].start_round("r1").await;

    // The next thing everybody sees is the third player joining, not an assignment
    let state = room.add_player("Carlos").await;
    assert_eq!(state.phase, "join");
}

#[tokio::test]
async fn actions_for_another_room_are_ignored() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos"]).await;

    room.players[0].start_round("r2").await;

    let state = room.add_player("Dani").await;
    assert_eq!(state.phase, "join");
    assert_eq!(state.players.len(), 4);
}

#[tokio::test]
async fn second_join_room_is_ignored() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea"]).await;

    room.players[0].join_room("r2").await;

    let state = room.add_player("Carlos").await;
    assert_eq!(state.players.len(), 3);
    assert_eq!(state.players[0].name, "Ana");
}

#[tokio::test]
async fn round_assigns_one_impostor_and_one_word() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos", "Dani"]).await;

    // Word equality and the single impostor are checked while reading the assignments
    let impostor = room.start_round().await;

    assert!(impostor < 4);
}

#[tokio::test]
async fn join_during_round_is_locked() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos"]).await;
    room.start_round().await;

    let mut late = room.app.connect_player("Dani").await;
    late.join_room("r1").await;

    match late.receive().await.unwrap() {
        WsMessageIn::RoomLocked { message } => assert_eq!(message, "La partida ya está en curso"),
        message => panic!("Expected room_locked, got {message:?}"),
    }
    for player in room.players.iter_mut() {
        player.assert_nothing_pending().await;
    }
}

#[tokio::test]
async fn tie_keeps_the_room_voting() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos", "Dani"]).await;
    room.start_round().await;
    room.start_vote().await;

    room.vote(&[(0, 1), (1, 0), (2, 0), (3, 1)]).await;

    for player in room.players.iter_mut() {
        assert!(matches!(
            player.receive().await.unwrap(),
            WsMessageIn::VoteState { votes } if votes.len() == 4
        ));
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::VoteTie {
                tied_players: vec!["Ana".to_string(), "Bea".to_string()],
                message: "Empate entre: Ana, Bea. ¡Voten de nuevo!".to_string()
            }
        );
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::VoteState {
                votes: HashMap::default()
            }
        );
    }
}

#[tokio::test]
async fn impostor_caught_resets_the_room() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos"]).await;
    let impostor = room.start_round().await;
    let citizen = citizen_other_than(impostor, &[], 3);
    room.start_vote().await;

    let votes: Vec<(usize, usize)> = (0..3)
        .map(|voter| (voter, if voter == impostor { citizen } else { impostor }))
        .collect();
    room.vote(&votes).await;

    let impostor_name = room.players[impostor].name.clone();
    let started = time::Instant::now();
    for player in room.players.iter_mut() {
        assert!(matches!(player.receive().await.unwrap(), WsMessageIn::VoteState { .. }));
        let state = player.receive_room_state().await;
        assert_eq!(state.players.iter().filter(|player| player.alive).count(), 2);
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::RoundResults {
                impostor_name: Some(impostor_name.clone()),
                eliminated_name: impostor_name.clone(),
                eliminated_was_impostor: true
            }
        );
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::Phase {
                value: "results".to_string()
            }
        );
    }

    for player in room.players.iter_mut() {
        let state = player.receive_room_state().await;
        assert_eq!(state.phase, "join");
        assert!(state.players.iter().all(|player| player.alive));
    }
    assert!(started.elapsed() >= room.app.restart_delay / 2);
}

#[tokio::test]
async fn impostor_wins_when_two_players_are_left() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos"]).await;
    let impostor = room.start_round().await;
    let citizen = citizen_other_than(impostor, &[], 3);
    room.start_vote().await;

    let votes: Vec<(usize, usize)> = (0..3)
        .map(|voter| (voter, if voter == citizen { impostor } else { citizen }))
        .collect();
    room.vote(&votes).await;

    let impostor_name = room.players[impostor].name.clone();
    let citizen_name = room.players[citizen].name.clone();
    for player in room.players.iter_mut() {
        assert_eq!(
            player
                .receive_until(|message| matches!(message, WsMessageIn::ImpostorWins { .. }))
                .await,
            WsMessageIn::ImpostorWins {
                impostor_name: impostor_name.clone(),
                eliminated_name: citizen_name.clone()
            }
        );
        let state = player
            .receive_until(|message| {
                matches!(message, WsMessageIn::RoomState { phase, .. } if phase == "join")
            })
            .await;
        match state {
            WsMessageIn::RoomState { players, .. } => {
                assert!(players.iter().all(|player| player.alive))
            }
            _ => unreachable!(),
        }
    }
}

#[tokio::test]
async fn citizen_elimination_resumes_voting_after_delay() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos", "Dani"]).await;
    let impostor = room.start_round().await;
    let citizen = citizen_other_than(impostor, &[], 4);
    room.start_vote().await;

    let votes: Vec<(usize, usize)> = (0..4)
        .map(|voter| (voter, if voter == citizen { impostor } else { citizen }))
        .collect();
    room.vote(&votes).await;

    let citizen_name = room.players[citizen].name.clone();
    let started = time::Instant::now();
    for player in room.players.iter_mut() {
        assert_eq!(
            player
                .receive_until(|message| matches!(message, WsMessageIn::RoundResults { .. }))
                .await,
            WsMessageIn::RoundResults {
                impostor_name: None,
                eliminated_name: citizen_name.clone(),
                eliminated_was_impostor: false
            }
        );
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::Phase {
                value: "results".to_string()
            }
        );
    }
    for player in room.players.iter_mut() {
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::Phase {
                value: "vote".to_string()
            }
        );
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::VoteState {
                votes: HashMap::default()
            }
        );
    }
    assert!(started.elapsed() >= room.app.round_advance_delay / 2);
}

#[tokio::test]
async fn next_round_skips_the_wait_and_cancels_the_timer() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos", "Dani"]).await;
    let impostor = room.start_round().await;
    let citizen = citizen_other_than(impostor, &[], 4);
    let survivor = citizen_other_than(impostor, &[citizen], 4);
    room.start_vote().await;

    let votes: Vec<(usize, usize)> = (0..4)
        .map(|voter| (voter, if voter == citizen { impostor } else { citizen }))
        .collect();
    room.vote(&votes).await;
    for player in room.players.iter_mut() {
        player
            .receive_until(|message| {
                matches!(message, WsMessageIn::Phase { value } if value == "results")
            })
            .await;
    }

    room.players[survivor].next_round("r1").await;
    // The eliminated player is ignored
    room.players[citizen].next_round("r1").await;

    for player in room.players.iter_mut() {
        assert_eq!(
            player.receive().await.unwrap(),
            WsMessageIn::Phase {
                value: "vote".to_string()
            }
        );
        assert!(matches!(
            player.receive().await.unwrap(),
            WsMessageIn::VoteState { votes } if votes.is_empty()
        ));
    }
    time::sleep(room.app.round_advance_delay * 2).await;
    for player in room.players.iter_mut() {
        player.assert_nothing_pending().await;
    }
}

#[tokio::test]
async fn impostor_leaving_aborts_the_round() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos"]).await;
    let impostor = room.start_round().await;

    let leaver = room.players.remove(impostor);
    drop(leaver);

    for player in room.players.iter_mut() {
        let state = player.receive_room_state().await;
        assert_eq!(state.phase, "join");
        assert_eq!(state.players.len(), 2);
        assert!(state.players.iter().all(|player| player.alive));
    }
}

#[tokio::test]
async fn leaving_during_vote_completes_the_quorum() {
    let mut room = TestRoom::create_with_players("r1", &["Ana", "Bea", "Carlos", "Dani"]).await;
    let impostor = room.start_round().await;
    let target = citizen_other_than(impostor, &[], 4);
    let leaver = citizen_other_than(impostor, &[target], 4);
    let other = citizen_other_than(impostor, &[target, leaver], 4);
    room.start_vote().await;

    room.vote(&[(impostor, target), (other, target), (target, impostor)])
        .await;
    for (index, player) in room.players.iter_mut().enumerate() {
        if index != leaver {
            assert!(matches!(
                player.receive().await.unwrap(),
                WsMessageIn::VoteState { votes } if votes.len() == 3
            ));
        }
    }

    let impostor_name = room.players[impostor].name.clone();
    let target_name = room.players[target].name.clone();
    let leaver_player = room.players.remove(leaver);
    drop(leaver_player);

    for player in room.players.iter_mut() {
        let state = player.receive_room_state().await;
        assert_eq!(state.players.len(), 3);
        assert_eq!(
            player
                .receive_until(|message| matches!(message, WsMessageIn::ImpostorWins { .. }))
                .await,
            WsMessageIn::ImpostorWins {
                impostor_name: impostor_name.clone(),
                eliminated_name: target_name.clone()
            }
        );
    }
}
