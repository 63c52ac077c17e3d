//! # Purchase Email Template
//!
//! HTML body for the fulfillment email. The copy mirrors the storefront:
//! dark background, what's-included list, and the exclusive license terms.

/// Subject line for a purchase email
pub fn purchase_subject(beat_name: &str) -> String {
    format!("Your Exclusive Beat Purchase - {}", beat_name)
}

/// HTML body for a purchase email.
///
/// The stems line is listed only when the stems archive was purchased.
pub fn purchase_html(
    store_name: &str,
    support_email: &str,
    beat_name: &str,
    include_stems: bool,
) -> String {
    let stems_line = if include_stems {
        "<li>Full stems (individual tracks)</li>"
    } else {
        ""
    };

    format!(
        r#"
<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background: #0B0F1F; color: #e2e8f0;">
    <div style="text-align: center; padding: 20px 0; border-bottom: 1px solid rgba(148, 163, 184, 0.2);">
        <h1 style="color: #e2e8f0; margin: 0; font-size: 28px;">{store_name}</h1>
        <p style="color: #94a3b8; margin: 5px 0 0;">Exclusive Beat Purchase</p>
    </div>

    <div style="padding: 30px 20px;">
        <h2 style="color: #22c55e; margin-bottom: 20px;">Thank you for your purchase!</h2>

        <p style="color: #cbd5e1; line-height: 1.6;">
            Your exclusive beat <strong style="color: #fff;">{beat_name}</strong> is attached to this email.
        </p>

        <div style="background: rgba(34, 197, 94, 0.1); border: 1px solid rgba(34, 197, 94, 0.3); border-radius: 8px; padding: 15px; margin: 20px 0;">
            <h3 style="color: #22c55e; margin: 0 0 10px; font-size: 16px;">What's Included:</h3>
            <ul style="color: #cbd5e1; margin: 0; padding-left: 20px;">
                <li>High-quality WAV file</li>
                {stems_line}
                <li>Exclusive license (full ownership)</li>
            </ul>
        </div>

        <div style="background: rgba(245, 158, 11, 0.1); border: 1px solid rgba(245, 158, 11, 0.3); border-radius: 8px; padding: 15px; margin: 20px 0;">
            <h3 style="color: #f59e0b; margin: 0 0 10px; font-size: 16px;">Exclusive License Terms:</h3>
            <ul style="color: #cbd5e1; margin: 0; padding-left: 20px; font-size: 14px;">
                <li>You own 100% of the rights to this beat</li>
                <li>Unlimited commercial use</li>
                <li>No royalties to pay</li>
                <li>This beat has been removed from our store</li>
                <li>You can register the song with PROs</li>
            </ul>
        </div>

        <p style="color: #94a3b8; font-size: 14px; margin-top: 30px;">
            If you have any questions, reply to this email or contact us at {support_email}
        </p>
    </div>

    <div style="text-align: center; padding: 20px; border-top: 1px solid rgba(148, 163, 184, 0.2); color: #64748b; font-size: 12px;">
        <p>&copy; 2026 {store_name}. All rights reserved.</p>
    </div>
</div>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject() {
        assert_eq!(
            purchase_subject("GN1"),
            "Your Exclusive Beat Purchase - GN1"
        );
    }

    #[test]
    fn test_stems_line_only_when_purchased() {
        let with_stems = purchase_html("MILLERS", "contact@millersaudio.com", "GN1", true);
        assert!(with_stems.contains("Full stems (individual tracks)"));
        assert!(with_stems.contains("GN1"));
        assert!(with_stems.contains("MILLERS"));

        let wav_only = purchase_html("MILLERS", "contact@millersaudio.com", "GN1", false);
        assert!(!wav_only.contains("Full stems"));
        assert!(wav_only.contains("High-quality WAV file"));
    }
}
