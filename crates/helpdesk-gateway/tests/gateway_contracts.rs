use helpdesk_domain::{TicketId, TicketStatus, UserId};
use helpdesk_gateway::{BackendGateway, GatewayError, InMemoryGateway, InMemorySeed};

async fn assert_shared_gateway_contract<G>(gateway: &G)
where
    G: BackendGateway,
{
    let author = gateway
        .login("foo", "bar1")
        .await
        .expect("login call succeeds")
        .expect("seeded account logs in");

    let draft = gateway.create_ticket("Monitor flickers", &author);
    assert!(draft.id.is_none(), "drafts must not carry an id");
    assert_eq!(draft.status, TicketStatus::New);

    let mut saved = gateway.save_ticket(&draft).await.expect("first save");
    let id = saved.id.expect("first save assigns an id");

    saved.status = TicketStatus::Solved;
    let resaved = gateway.save_ticket(&saved).await.expect("second save");
    assert_eq!(resaved.id, Some(id), "resave keeps the id");

    let loaded = gateway
        .get_ticket_details(id)
        .await
        .expect("details call")
        .expect("saved ticket is retrievable");
    assert_eq!(loaded.status, TicketStatus::Solved);

    assert!(gateway
        .get_ticket_details(TicketId::new(4_242))
        .await
        .expect("details call")
        .is_none());

    let missing_user = gateway
        .get_user(UserId::new(4_242))
        .await
        .expect_err("unknown user");
    assert!(matches!(missing_user, GatewayError::NotFound(_)));
}

#[tokio::test]
async fn in_memory_gateway_satisfies_shared_contract() {
    let gateway = InMemoryGateway::new(InMemorySeed::demo());
    assert_shared_gateway_contract(&gateway).await;
}
