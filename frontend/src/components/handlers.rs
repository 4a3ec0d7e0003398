use crate::api::BrowserFile;
use web_sys::{ClipboardEvent, DragEvent, Event, FileList, HtmlInputElement};
use yew::TargetCast;

/// Only the first file counts; every view works on one document at a time.
pub fn first_file(file_list: Option<FileList>) -> Option<BrowserFile> {
    let file_list = file_list?;
    if file_list.length() > 1 {
        log::warn!("{} files offered; using the first", file_list.length());
    }
    file_list.item(0).map(BrowserFile::from)
}

pub fn file_from_input(event: &Event) -> Option<BrowserFile> {
    let input: HtmlInputElement = event.target_unchecked_into();
    let file = first_file(input.files());
    input.set_value("");
    file
}

pub fn file_from_drop(event: &DragEvent) -> Option<BrowserFile> {
    event.prevent_default();
    first_file(event.data_transfer().and_then(|transfer| transfer.files()))
}

pub fn file_from_paste(event: &ClipboardEvent) -> Option<BrowserFile> {
    let file = first_file(event.clipboard_data().and_then(|data| data.files()))?;
    event.prevent_default();
    Some(file)
}
