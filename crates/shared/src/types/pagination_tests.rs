use rstest::rstest;

use super::*;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 50);
}

#[rstest]
#[case(1, 20, 0)]
#[case(2, 20, 20)]
#[case(5, 50, 200)]
#[case(0, 10, 0)]
fn test_page_request_offset(#[case] page: u32, #[case] per_page: u32, #[case] offset: u64) {
    assert_eq!(PageRequest { page, per_page }.offset(), offset);
}

#[test]
fn test_normalized_clamps_bounds() {
    let request = PageRequest {
        page: 0,
        per_page: 10_000,
    }
    .normalized();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, MAX_PER_PAGE);
}

#[rstest]
#[case(0, 1)]
#[case(1, 1)]
#[case(20, 1)]
#[case(21, 2)]
#[case(100, 5)]
fn test_total_pages(#[case] total: u64, #[case] pages: u64) {
    let request = PageRequest {
        page: 1,
        per_page: 20,
    };
    let response = PageResponse::new(Vec::<u8>::new(), &request, total);
    assert_eq!(response.meta.total_pages, pages);
    assert_eq!(response.meta.total, total);
}
