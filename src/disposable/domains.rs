use phf::phf_set;

/// Throwaway-mailbox providers known at build time. Lower-case, no trailing dot.
pub(crate) const DISPOSABLE_DOMAINS: phf::Set<&'static str> = phf_set! {
    "0-mail.com",
    "0815.ru",
    "10minutemail.com",
    "10minutemail.net",
    "10minutemail.org",
    "20minutemail.com",
    "33mail.com",
    "anonbox.net",
    "anonymbox.com",
    "binkmail.com",
    "bobmail.info",
    "burnermail.io",
    "byom.de",
    "chammy.info",
    "deadaddress.com",
    "despam.it",
    "discard.email",
    "discardmail.com",
    "dispostable.com",
    "dodgit.com",
    "dropmail.me",
    "e4ward.com",
    "emailondeck.com",
    "emailtemporanea.net",
    "fakeinbox.com",
    "fakemail.net",
    "filzmail.com",
    "getairmail.com",
    "getnada.com",
    "guerrillamail.biz",
    "guerrillamail.com",
    "guerrillamail.de",
    "guerrillamail.info",
    "guerrillamail.net",
    "guerrillamail.org",
    "guerrillamailblock.com",
    "harakirimail.com",
    "incognitomail.org",
    "inboxbear.com",
    "jetable.org",
    "kasmail.com",
    "mail-temporaire.fr",
    "mailcatch.com",
    "maildrop.cc",
    "mailexpire.com",
    "mailforspam.com",
    "mailinator.com",
    "mailinator.net",
    "mailinator2.com",
    "mailnesia.com",
    "mailnull.com",
    "mailsac.com",
    "mailtemp.info",
    "meltmail.com",
    "mintemail.com",
    "mohmal.com",
    "moakt.com",
    "mt2015.com",
    "mytemp.email",
    "mytrashmail.com",
    "nada.email",
    "no-spam.ws",
    "nospamfor.us",
    "nowmymail.com",
    "objectmail.com",
    "onewaymail.com",
    "owlpic.com",
    "pookmail.com",
    "proxymail.eu",
    "rcpt.at",
    "sharklasers.com",
    "shieldemail.com",
    "spam4.me",
    "spambog.com",
    "spambox.us",
    "spamfree24.org",
    "spamgourmet.com",
    "spamhole.com",
    "spaml.de",
    "spammotel.com",
    "spamspot.com",
    "tempail.com",
    "tempemail.com",
    "tempemail.net",
    "tempinbox.com",
    "tempmail.com",
    "tempmail.net",
    "tempmail.plus",
    "tempmailo.com",
    "tempr.email",
    "temp-mail.io",
    "temp-mail.org",
    "throwawaymail.com",
    "trash-mail.com",
    "trashmail.com",
    "trashmail.de",
    "trashmail.me",
    "trashmail.net",
    "trbvm.com",
    "wegwerfmail.de",
    "wegwerfmail.net",
    "yopmail.com",
    "yopmail.fr",
    "yopmail.net",
    "zetmail.com",
};
