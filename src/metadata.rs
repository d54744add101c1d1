use lofty::{
    config::WriteOptions,
    file::{AudioFile, TaggedFileExt},
    read_from_path,
    tag::{Accessor, Tag},
};
use std::path::Path;

/// Writes the video title and its source URL into the tags of a freshly encoded file.
pub(crate) fn tag_mp3(
    path: &Path,
    title: &str,
    source_url: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut tagged_file = read_from_path(path)?;

    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        log::debug!("No tags found, creating a new tag of type `{tag_type:?}`");
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or("file format does not support tags")?;

    tag.set_title(title.to_string());
    tag.set_comment(source_url.to_string());

    let write_options = WriteOptions::new()
        .use_id3v23(true)
        .remove_others(false)
        .respect_read_only(false);

    tagged_file.save_to_path(path, write_options)?;
    Ok(())
}
