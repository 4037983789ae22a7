use super::*;
use rstest::rstest;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 100);
}

#[rstest]
#[case(1, 20, 0)]
#[case(2, 20, 20)]
#[case(0, 20, 0)]
#[case(3, 10_000, 1_000)]
fn test_page_request_offset(#[case] page: u32, #[case] per_page: u32, #[case] offset: u64) {
    assert_eq!(PageRequest::new(page, per_page).offset(), offset);
}

#[test]
fn test_page_request_limit_is_clamped() {
    assert_eq!(PageRequest::new(1, 50).limit(), 50);
    assert_eq!(PageRequest::new(1, 0).limit(), 1);
    assert_eq!(PageRequest::new(1, 9_999).limit(), u64::from(MAX_PER_PAGE));
}

#[test]
fn test_page_response_new() {
    let data = vec![1, 2, 3];
    let response = PageResponse::new(data.clone(), PageRequest::new(1, 10), 3);

    assert_eq!(response.data, data);
    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.per_page, 10);
    assert_eq!(response.meta.total, 3);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_rounds_pages_up() {
    // 25 rows, 10 per page -> 3 pages
    let response: PageResponse<i32> = PageResponse::new(vec![], PageRequest::new(1, 10), 25);
    assert_eq!(response.meta.total_pages, 3);
}

#[test]
fn test_page_response_empty() {
    let response: PageResponse<i32> = PageResponse::new(vec![], PageRequest::new(1, 10), 0);
    assert_eq!(response.meta.total_pages, 1);
}
