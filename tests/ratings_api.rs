mod common;

use axum::http::{Method, StatusCode};
use common::{bearer, TestApp};
use event_booking::models::{EventStatus, NewRating};
use serde_json::json;

#[tokio::test]
async fn test_rating_create() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let event = app.planned_event(&user).await;
    app.book(&user, &event).await;
    let event = app.set_status(&event, EventStatus::Completed).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/ratings/",
            Some(&bearer(&user)),
            Some(json!({"event": event.id, "score": 5})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["score"], 5);

    let ratings = app.state.ratings.list_for_user(user.id()).await.unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].user_id, user.id());
    assert_eq!(ratings[0].event_id, event.id);
    assert_eq!(ratings[0].score, 5);
}

#[tokio::test]
async fn test_create_rating_for_past_event() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let past_event = app.past_event(&user).await;
    app.book(&user, &past_event).await;

    let (status, _) = app
        .json(
            Method::POST,
            "/api/v1/ratings/",
            Some(&bearer(&user)),
            Some(json!({"event": past_event.id, "score": 4})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(app.state.ratings.exists(user.id(), past_event.id).await.unwrap());
}

#[tokio::test]
async fn test_rating_rejected_for_planned_event() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let event = app.planned_event(&user).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/ratings/",
            Some(&bearer(&user)),
            Some(json!({"event": event.id, "score": 4})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.to_string().contains("Можно оценивать только завершенные события"));
}

#[tokio::test]
async fn test_rating_rejected_for_planned_event_even_when_booked() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let event = app.planned_event(&user).await;
    app.book(&user, &event).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/ratings/",
            Some(&bearer(&user)),
            Some(json!({"event": event.id, "score": 3})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Можно оценивать только завершенные события");
    assert!(!app.state.ratings.exists(user.id(), event.id).await.unwrap());
}

#[tokio::test]
async fn test_rating_rejected_for_non_participant() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let past_event = app.past_event(&user).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/ratings/",
            Some(&bearer(&user)),
            Some(json!({"event": past_event.id, "score": 4})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.to_string().contains("Можно оценивать только свои посещенные события"));
}

#[tokio::test]
async fn test_rating_twice_is_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let past_event = app.past_event(&user).await;
    app.book(&user, &past_event).await;
    app.state
        .ratings
        .create(&NewRating { user_id: user.id(), event_id: past_event.id, score: 2 })
        .await
        .unwrap();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/ratings/",
            Some(&bearer(&user)),
            Some(json!({"event": past_event.id, "score": 5})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Вы уже оценили это событие");
}

#[tokio::test]
async fn test_rating_score_out_of_range_is_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let past_event = app.past_event(&user).await;
    app.book(&user, &past_event).await;

    for score in [0, 6] {
        let (status, body) = app
            .json(
                Method::POST,
                "/api/v1/ratings/",
                Some(&bearer(&user)),
                Some(json!({"event": past_event.id, "score": score})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Оценка должна быть от 1 до 5"));
    }
    assert!(!app.state.ratings.exists(user.id(), past_event.id).await.unwrap());
}

#[tokio::test]
async fn test_rating_from_form_body() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let past_event = app.past_event(&user).await;
    app.book(&user, &past_event).await;

    let body = format!("event={}&score=4", past_event.id);
    let (status, created) = app.form("/api/v1/ratings/", &bearer(&user), &body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["score"], 4);
    assert_eq!(created["event"], past_event.id);
}

#[tokio::test]
async fn test_rating_from_multipart_body() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let event = app.planned_event(&user).await;
    app.book(&user, &event).await;
    let event = app.set_status(&event, EventStatus::Completed).await;

    let fields = [("event", event.id.to_string()), ("score", "5".to_string())];
    let (status, created) = app
        .multipart(Method::POST, "/api/v1/ratings/", &bearer(&user), &fields)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["score"], 5);
    assert_eq!(created["event"], event.id);
}

#[tokio::test]
async fn test_rating_list_shows_own_ratings() {
    let app = TestApp::new().await;
    let user = app.create_user("testuser").await;
    let other = app.create_user("other").await;
    let past_event = app.past_event(&user).await;
    for u in [&user, &other] {
        app.book(u, &past_event).await;
        app.state
            .ratings
            .create(&NewRating { user_id: u.id(), event_id: past_event.id, score: 3 })
            .await
            .unwrap();
    }

    let (status, body) = app
        .json(Method::GET, "/api/v1/ratings/", Some(&bearer(&other)), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["user"], other.id());
}
