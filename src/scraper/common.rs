use scraper::ElementRef;

pub fn get_text_content(el: &ElementRef) -> String {
    el.text().collect::<Vec<_>>().join("")
}
