//! End-to-end wizard flows against a scripted gateway

mod common;

use common::{ack, cpv, detail, results, suggestions, FakeGateway};
use licitaciones_cli::errors::AppError;
use licitaciones_cli::models::Region;
use licitaciones_cli::regions::canonical_region;
use licitaciones_cli::view;
use licitaciones_cli::wizard::{
    Completion, Operation, Outcome, Session, Step, UserEvent, Wizard,
};

fn searched_gateway() -> FakeGateway {
    FakeGateway::new()
        .on_search(Ok(results(&["1", "2"], 2)))
        .on_populate(Ok(ack()))
        .on_list_cpv(Ok(vec![
            cpv("30200000", "Equipo informático"),
            cpv("45000000", "Trabajos de construcción"),
        ]))
}

async fn search_madrid(session: &mut Session<FakeGateway>) {
    session
        .dispatch(UserEvent::ToggleRegion(canonical_region("Madrid")))
        .await
        .unwrap();
    session.dispatch(UserEvent::SubmitRegions).await.unwrap();
}

#[tokio::test]
async fn search_shows_results_and_loads_cpv_codes() {
    let mut session = Session::new(Wizard::default(), searched_gateway());
    search_madrid(&mut session).await;

    let state = session.state();
    assert_eq!(state.step(), Step::ViewResults);
    assert_eq!(state.base_results().unwrap().total_count, 2);
    let shown: Vec<_> = state
        .active_results()
        .unwrap()
        .items
        .iter()
        .map(|t| t.id.clone().unwrap())
        .collect();
    assert_eq!(shown, ["1", "2"]);
    assert_eq!(state.available_cpvs().unwrap().len(), 2);
    assert_eq!(state.loading().count(), 0);
    assert_eq!(
        session.gateway().calls(),
        ["search madrid limit=100", "populate", "list_cpv"]
    );
}

#[tokio::test]
async fn cpv_filter_replaces_active_set_and_clear_restores_it() {
    let gateway = searched_gateway().on_filter(Ok(results(&["1"], 1)));
    let mut session = Session::new(Wizard::default(), gateway);
    search_madrid(&mut session).await;

    session
        .dispatch(UserEvent::ToggleCpv("30200000".into()))
        .await
        .unwrap();
    session.dispatch(UserEvent::ApplyCpvFilter).await.unwrap();

    let state = session.state();
    assert!(state.is_filtered());
    assert_eq!(state.active_results().unwrap().items.len(), 1);
    assert_eq!(state.base_results().unwrap().items.len(), 2);
    assert_eq!(session.gateway().calls().last().unwrap(), "filter 30200000");

    session.dispatch(UserEvent::ClearCpvFilter).await.unwrap();
    let state = session.state();
    assert!(!state.is_filtered());
    assert!(state.selected_cpv_codes().is_empty());
    assert_eq!(state.active_results().unwrap().items.len(), 2);
}

#[tokio::test]
async fn failed_detail_keeps_results_step() {
    let gateway =
        searched_gateway().on_detail(Err(AppError::NetworkError("HTTP 502: Bad gateway".into())));
    let mut session = Session::new(Wizard::default(), gateway);
    search_madrid(&mut session).await;

    let err = session
        .dispatch(UserEvent::OpenDetail("1".into()))
        .await
        .unwrap_err();
    assert!(err.is_remote());

    let state = session.state();
    assert_eq!(state.step(), Step::ViewResults);
    assert!(state.active_detail().is_none());
    assert!(state.pending_detail_key().is_none());
    assert!(session
        .gateway()
        .calls()
        .last()
        .unwrap()
        .starts_with("detail https://contrataciondelestado.es/licitacion/1 feed=licitaciones"));
}

#[tokio::test]
async fn detail_success_moves_to_detail_step() {
    let gateway = searched_gateway().on_detail(Ok(detail("Licitación 2")));
    let mut session = Session::new(Wizard::default(), gateway);
    search_madrid(&mut session).await;

    session
        .dispatch(UserEvent::OpenDetail("2".into()))
        .await
        .unwrap();
    assert_eq!(session.state().step(), Step::ViewDetail);
    assert_eq!(
        session.state().active_detail().unwrap().title,
        "Licitación 2"
    );

    session.dispatch(UserEvent::GoBack).await.unwrap();
    assert_eq!(session.state().step(), Step::ViewResults);
    assert!(session.state().active_detail().is_none());
}

#[tokio::test]
async fn region_change_clears_filter_and_cpv_selection() {
    let gateway = searched_gateway().on_filter(Ok(results(&["1"], 1)));
    let mut session = Session::new(Wizard::default(), gateway);
    search_madrid(&mut session).await;
    session
        .dispatch(UserEvent::ToggleCpv("30200000".into()))
        .await
        .unwrap();
    session.dispatch(UserEvent::ApplyCpvFilter).await.unwrap();
    assert!(session.state().is_filtered());

    session
        .dispatch(UserEvent::ToggleRegion(Region::from("galicia")))
        .await
        .unwrap();

    let state = session.state();
    assert!(state.filtered_results().is_none());
    assert!(state.selected_cpv_codes().is_empty());
    assert!(state.base_results().is_none());
    assert_eq!(state.step(), Step::SelectRegions);
    assert_eq!(state.selected_regions().len(), 2);
}

#[tokio::test]
async fn populate_failure_keeps_base_results() {
    let gateway = FakeGateway::new()
        .on_search(Ok(results(&["1", "2"], 2)))
        .on_populate(Err(AppError::BackendError("No hay búsqueda previa".into())));
    let mut session = Session::new(Wizard::default(), gateway);
    session
        .dispatch(UserEvent::ToggleRegion(Region::from("madrid")))
        .await
        .unwrap();

    let err = session.dispatch(UserEvent::SubmitRegions).await.unwrap_err();
    assert!(matches!(err, AppError::BackendError(_)));

    let state = session.state();
    assert_eq!(state.step(), Step::ViewResults);
    assert_eq!(state.base_results().unwrap().items.len(), 2);
    assert!(state.available_cpvs().is_none());
    assert_eq!(state.loading().count(), 0);
    assert_eq!(session.gateway().calls(), ["search madrid limit=100", "populate"]);
}

#[tokio::test]
async fn empty_region_submit_issues_no_request() {
    let mut session = Session::new(Wizard::default(), FakeGateway::new());
    let err = session.dispatch(UserEvent::SubmitRegions).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(session.gateway().calls().is_empty());
    assert_eq!(session.state().step(), Step::SelectRegions);
}

#[tokio::test]
async fn result_count_uses_backend_total() {
    let gateway = FakeGateway::new()
        .on_search(Ok(results(&["1", "2"], 812)))
        .on_populate(Ok(ack()))
        .on_list_cpv(Ok(Vec::new()));
    let mut session = Session::new(Wizard::default(), gateway);
    search_madrid(&mut session).await;

    let rendered = view::render(session.state(), "");
    assert!(rendered.contains("Found 812 tenders"));
}

#[tokio::test]
async fn requests_are_reported_in_chain_order() {
    let mut session = Session::new(Wizard::default(), searched_gateway());
    session
        .dispatch(UserEvent::ToggleRegion(Region::from("madrid")))
        .await
        .unwrap();

    let mut seen = Vec::new();
    session
        .dispatch_with(UserEvent::SubmitRegions, |request| {
            seen.push(request.operation())
        })
        .await
        .unwrap();
    assert_eq!(
        seen,
        [
            Operation::Search,
            Operation::PopulateCpv,
            Operation::ListAvailableCpv
        ]
    );
}

#[tokio::test]
async fn cpv_first_path_preselects_regions_and_filters() {
    let gateway = FakeGateway::new()
        .on_suggest(Ok(suggestions(&[("MADRID", 9), ("Galicia", 4)])))
        .on_search(Ok(results(&["1", "2", "3"], 3)))
        .on_populate(Ok(ack()))
        .on_list_cpv(Ok(vec![cpv("30200000", "Equipo informático")]))
        .on_filter(Ok(results(&["2"], 1)));
    let mut session = Session::new(Wizard::default(), gateway);

    session.dispatch(UserEvent::StartCpvIntent).await.unwrap();
    session
        .dispatch(UserEvent::AddCpvIntent("30200000-7".into()))
        .await
        .unwrap();
    session.dispatch(UserEvent::SubmitCpvIntent).await.unwrap();

    let selected: Vec<&str> = session
        .state()
        .selected_regions()
        .iter()
        .map(Region::as_str)
        .collect();
    assert_eq!(selected, ["galicia", "madrid"]);
    assert_eq!(session.state().step(), Step::SelectRegions);

    session.dispatch(UserEvent::SubmitRegions).await.unwrap();

    let state = session.state();
    assert!(state.is_filtered());
    assert_eq!(state.active_results().unwrap().total_count, 1);
    assert!(state.selected_cpv_codes().contains("30200000"));
    assert_eq!(
        session.gateway().calls(),
        [
            "suggest 30200000",
            "search galicia,madrid limit=100",
            "populate",
            "list_cpv",
            "filter 30200000"
        ]
    );
}

#[test]
fn stale_detail_completion_is_discarded() {
    let mut wizard = Wizard::default();
    wizard
        .handle(UserEvent::ToggleRegion(Region::from("madrid")))
        .unwrap();
    let search = wizard.handle(UserEvent::SubmitRegions).unwrap().unwrap();
    wizard
        .complete(Completion::success(
            search.ticket(),
            Outcome::Searched(results(&["1", "2"], 2)),
        ))
        .unwrap();

    let first = wizard
        .handle(UserEvent::OpenDetail("1".into()))
        .unwrap()
        .unwrap();
    let second = wizard
        .handle(UserEvent::OpenDetail("2".into()))
        .unwrap()
        .unwrap();
    assert_eq!(wizard.state().pending_detail_key(), Some("2"));

    let follow = wizard
        .complete(Completion::success(
            first.ticket(),
            Outcome::DetailFetched(detail("Licitación 1")),
        ))
        .unwrap();
    assert!(follow.is_empty());
    assert_eq!(wizard.state().step(), Step::ViewResults);
    assert!(wizard.state().active_detail().is_none());

    wizard
        .complete(Completion::success(
            second.ticket(),
            Outcome::DetailFetched(detail("Licitación 2")),
        ))
        .unwrap();
    assert_eq!(wizard.state().step(), Step::ViewDetail);
    assert_eq!(wizard.state().active_detail().unwrap().title, "Licitación 2");
}

#[test]
fn duplicate_triggers_are_ignored_while_outstanding() {
    let mut wizard = Wizard::default();
    wizard
        .handle(UserEvent::ToggleRegion(Region::from("madrid")))
        .unwrap();
    let search = wizard.handle(UserEvent::SubmitRegions).unwrap();
    assert!(search.is_some());
    assert!(wizard.handle(UserEvent::SubmitRegions).unwrap().is_none());

    let search = search.unwrap();
    let follow = wizard
        .complete(Completion::success(
            search.ticket(),
            Outcome::Searched(results(&["1"], 1)),
        ))
        .unwrap();
    assert_eq!(follow.len(), 1);

    // A second completion for the same ticket is no longer current.
    let again = wizard
        .complete(Completion::success(
            search.ticket(),
            Outcome::Searched(results(&["9"], 1)),
        ))
        .unwrap();
    assert!(again.is_empty());
    assert_eq!(
        wizard.state().base_results().unwrap().items[0].id.as_deref(),
        Some("1")
    );
}
