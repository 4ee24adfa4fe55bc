//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance (migrations are applied on start)
//! - Environment variables: DATABASE_URL, JWT_SECRET, JWT_ISSUER,
//!   JWT_AUDIENCE, API_PORT, PAYMENT_SECRET_KEY
//!
//! The payment provider is replaced by a local mock per test server.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use rust_decimal::Decimal;

fn dec(raw: &str) -> Decimal {
    raw.parse().expect("decimal")
}

/// Register a fresh user and return the auth payload
async fn register(server: &TestServer) -> (RegisterRequest, AuthResponse) {
    let request = RegisterRequest::unique();
    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    let auth = assert_json(response, StatusCode::CREATED).await.unwrap();
    (request, auth)
}

/// Register a user, promote it and log in again for an admin token
async fn admin_token(server: &TestServer) -> String {
    let (request, auth) = register(server).await;
    server.promote_to_admin(&auth.user.id).await.unwrap();

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.user.role, "Admin");
    auth.access_token
}

async fn create_coupon(server: &TestServer, token: &str, request: &CreateCouponRequest) -> CouponResponse {
    let response = server.post_auth("/api/v1/coupons", token, request).await.unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["database"], "healthy");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (request, auth) = register(&server).await;

    assert_eq!(auth.user.username, request.username);
    assert_eq!(auth.user.role, "Member");
    assert_eq!(auth.token_type, "Bearer");
    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (first, _) = register(&server).await;

    // Same email in a different case, everything else fresh
    let mut second = RegisterRequest::unique();
    second.email = first.email.to_uppercase();

    let response = server.post("/api/v1/auth/register", &second).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_login() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (request, _) = register(&server).await;

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(auth.user.username, request.username);
    assert!(!auth.access_token.is_empty());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (request, _) = register(&server).await;

    let wrong_password = LoginRequest {
        email: request.email.clone(),
        password: "WrongPass123!".to_string(),
    };
    let unknown_email = LoginRequest {
        email: format!("nobody{}@example.com", unique_suffix()),
        password: "TestPass123!".to_string(),
    };

    for login in [wrong_password, unknown_email] {
        let response = server.post("/api/v1/auth/login", &login).await.unwrap();
        assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (_, auth) = register(&server).await;

    let refresh_req = RefreshTokenRequest {
        refresh_token: auth.refresh_token.clone(),
    };
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    let rotated: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(rotated.refresh_token, auth.refresh_token);

    // The old token was consumed by the rotation
    let response = server.post("/api/v1/auth/refresh", &refresh_req).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // The new one works exactly once more
    let response = server
        .post(
            "/api/v1/auth/refresh",
            &RefreshTokenRequest {
                refresh_token: rotated.refresh_token,
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_logout_single_session() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (request, first) = register(&server).await;

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let second: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/auth/logout",
            &first.access_token,
            &LogoutRequest {
                refresh_token: first.refresh_token.clone(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let revoked = RefreshTokenRequest {
        refresh_token: first.refresh_token,
    };
    let response = server.post("/api/v1/auth/refresh", &revoked).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // The other session is untouched
    let other = RefreshTokenRequest {
        refresh_token: second.refresh_token,
    };
    let response = server.post("/api/v1/auth/refresh", &other).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_logout_all_sessions() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (request, first) = register(&server).await;

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let second: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth_empty("/api/v1/auth/logout", &first.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    for token in [first.refresh_token, second.refresh_token] {
        let response = server
            .post("/api/v1/auth/refresh", &RefreshTokenRequest { refresh_token: token })
            .await
            .unwrap();
        assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
    }
}

#[tokio::test]
async fn test_me() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (request, auth) = register(&server).await;

    let response = server
        .get_auth("/api/v1/auth/me", &auth.access_token)
        .await
        .unwrap();
    let me: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.id, auth.user.id);
    assert_eq!(me.email, request.email.to_lowercase());
}

#[tokio::test]
async fn test_unauthorized_access() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/v1/auth/me").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .get_auth("/api/v1/profile/orders", "invalid_token")
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Checkout Tests
// ============================================================================

#[tokio::test]
async fn test_checkout_flow_with_coupon() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = admin_token(&server).await;
    let coupon = create_coupon(&server, &admin, &CreateCouponRequest::percentage("10")).await;

    let (_, buyer) = register(&server).await;
    let mug = server.seed_product("Stoneware mug", dec("25.00")).await.unwrap();
    let bowl = server.seed_product("Serving bowl", dec("50.00")).await.unwrap();
    let items = vec![CartItem::new(mug, 2), CartItem::new(bowl, 1)];

    // Quote
    let intent_id = format!("pi_{}", unique_suffix());
    server.mock_intent_creation(&intent_id, 9000).await;
    let response = server
        .post_auth(
            "/api/v1/payment/create-intent",
            &buyer.access_token,
            &CreatePaymentIntentRequest {
                items: items.clone(),
                coupon_code: Some(coupon.code.to_lowercase()),
            },
        )
        .await
        .unwrap();
    let quote: PaymentIntentResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(quote.payment_intent_id, intent_id);
    assert!(quote.client_secret.is_some());
    assert!(quote.coupon_applied);
    assert_eq!(dec(&quote.subtotal), dec("100"));
    assert_eq!(dec(&quote.discount), dec("10"));
    assert_eq!(dec(&quote.total), dec("90"));

    // Pay, then check out
    server
        .mock_settled_intent(&intent_id, 9000, &buyer.user.id)
        .await;
    let checkout = CheckoutRequest {
        items,
        payment_reference: intent_id.clone(),
        coupon_code: Some(coupon.code.clone()),
    };
    let response = server
        .post_auth("/api/v1/profile/checkout", &buyer.access_token, &checkout)
        .await
        .unwrap();
    let order: OrderResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(order.status, "processing");
    assert_eq!(dec(&order.total_amount), dec("90"));
    assert_eq!(dec(&order.discount_amount), dec("10"));
    assert_eq!(order.payment_reference.as_deref(), Some(intent_id.as_str()));
    assert_eq!(order.items.len(), 2);

    // Replaying the same payment returns the same order
    let response = server
        .post_auth("/api/v1/profile/checkout", &buyer.access_token, &checkout)
        .await
        .unwrap();
    let replay: OrderResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(replay.id, order.id);

    // The coupon was counted once
    let response = server
        .get_auth(&format!("/api/v1/coupons/{}", coupon.code), &admin)
        .await
        .unwrap();
    let coupon: CouponResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(coupon.times_used, 1);

    // History
    let response = server
        .get_auth("/api/v1/profile/orders", &buyer.access_token)
        .await
        .unwrap();
    let history: Paginated<OrderResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].id, order.id);

    let response = server
        .get_auth(
            &format!("/api/v1/profile/orders/{}", order.id),
            &buyer.access_token,
        )
        .await
        .unwrap();
    let fetched: OrderResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.items.len(), 2);
}

#[tokio::test]
async fn test_checkout_rejects_unsettled_payment() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (_, buyer) = register(&server).await;
    let mug = server.seed_product("Stoneware mug", dec("25.00")).await.unwrap();

    let intent_id = format!("pi_{}", unique_suffix());
    server
        .mock_pending_intent(&intent_id, 2500, &buyer.user.id)
        .await;

    let response = server
        .post_auth(
            "/api/v1/profile/checkout",
            &buyer.access_token,
            &CheckoutRequest {
                items: vec![CartItem::new(mug, 1)],
                payment_reference: intent_id,
                coupon_code: None,
            },
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "PAYMENT_NOT_SETTLED")
        .await
        .unwrap();

    let response = server
        .get_auth("/api/v1/profile/orders", &buyer.access_token)
        .await
        .unwrap();
    let history: Paginated<OrderResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(history.total, 0);
}

#[tokio::test]
async fn test_checkout_rejects_amount_mismatch() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (_, buyer) = register(&server).await;
    let mug = server.seed_product("Stoneware mug", dec("25.00")).await.unwrap();

    // Paid for one mug, asks for two
    let intent_id = format!("pi_{}", unique_suffix());
    server
        .mock_settled_intent(&intent_id, 2500, &buyer.user.id)
        .await;

    let response = server
        .post_auth(
            "/api/v1/profile/checkout",
            &buyer.access_token,
            &CheckoutRequest {
                items: vec![CartItem::new(mug, 2)],
                payment_reference: intent_id,
                coupon_code: None,
            },
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "PAYMENT_AMOUNT_MISMATCH")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_foreign_order_is_not_found() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (_, buyer) = register(&server).await;
    let (_, stranger) = register(&server).await;
    let mug = server.seed_product("Stoneware mug", dec("25.00")).await.unwrap();

    let intent_id = format!("pi_{}", unique_suffix());
    server
        .mock_settled_intent(&intent_id, 2500, &buyer.user.id)
        .await;
    let response = server
        .post_auth(
            "/api/v1/profile/checkout",
            &buyer.access_token,
            &CheckoutRequest {
                items: vec![CartItem::new(mug, 1)],
                payment_reference: intent_id,
                coupon_code: None,
            },
        )
        .await
        .unwrap();
    let order: OrderResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get_auth(
            &format!("/api/v1/profile/orders/{}", order.id),
            &stranger.access_token,
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND, "UNKNOWN_ORDER")
        .await
        .unwrap();
}

// ============================================================================
// Coupon Admin Tests
// ============================================================================

#[tokio::test]
async fn test_coupon_admin_requires_admin_role() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let (_, member) = register(&server).await;

    let response = server
        .post_auth(
            "/api/v1/coupons",
            &member.access_token,
            &CreateCouponRequest::percentage("10"),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "ADMIN_REQUIRED")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_coupon_lifecycle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = admin_token(&server).await;

    let request = CreateCouponRequest::percentage("15");
    let created = create_coupon(&server, &admin, &request).await;
    assert_eq!(created.code, request.code);
    assert_eq!(created.discount_type, "percentage");
    assert!(created.is_active);
    assert_eq!(created.times_used, 0);

    // Duplicate code, any case
    let mut duplicate = CreateCouponRequest::percentage("5");
    duplicate.code = request.code.to_lowercase();
    let response = server.post_auth("/api/v1/coupons", &admin, &duplicate).await.unwrap();
    assert_error(response, StatusCode::CONFLICT, "COUPON_CODE_EXISTS")
        .await
        .unwrap();

    // Partial update
    let path = format!("/api/v1/coupons/{}", created.code);
    let response = server
        .patch_auth(
            &path,
            &admin,
            &UpdateCouponRequest {
                max_uses: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let updated: CouponResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(updated.max_uses, Some(3));
    assert_eq!(dec(&updated.discount_value), dec("15"));

    // Deactivate keeps the record
    let response = server.delete_auth(&path, &admin).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    let response = server.get_auth(&path, &admin).await.unwrap();
    let deactivated: CouponResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!deactivated.is_active);

    let response = server
        .get_auth("/api/v1/coupons/NO-SUCH-COUPON", &admin)
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND, "UNKNOWN_COUPON")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_featured_coupons_are_public() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let admin = admin_token(&server).await;

    let featured = create_coupon(
        &server,
        &admin,
        &CreateCouponRequest::percentage("20").featured(),
    )
    .await;
    let plain = create_coupon(&server, &admin, &CreateCouponRequest::percentage("20")).await;

    let response = server
        .get("/api/v1/coupons/featured?perPage=100")
        .await
        .unwrap();
    let page: Paginated<CouponResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    assert!(page.items.iter().all(|c| c.is_featured && c.is_active));
    assert!(page.items.iter().any(|c| c.id == featured.id));
    assert!(page.items.iter().all(|c| c.id != plain.id));
}
